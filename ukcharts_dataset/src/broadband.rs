// Fixed broadband performance per local authority.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct BroadbandSpeed {
    /// Mb/s
    #[serde(rename = "averageDown")]
    pub average_down: f64,
    /// Mb/s
    #[serde(rename = "averageUpload")]
    pub average_upload: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_reader;

    #[test]
    fn reads_speeds_by_header_name() {
        let data = "laua,averageUpload,laua_name,averageDown\nE06000001,10.5,Hartlepool,61.2\n";
        let rows: Vec<BroadbandSpeed> = from_reader(data.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![BroadbandSpeed {
                average_down: 61.2,
                average_upload: 10.5
            }]
        );
    }
}
