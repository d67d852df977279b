use serde::{Deserialize, Serialize};

/// Server count reported to the listing, either a total or one count per shard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerCount {
    Total(u64),
    Shards(Vec<u64>),
}

impl From<u64> for ServerCount {
    fn from(count: u64) -> Self {
        Self::Total(count)
    }
}

impl From<Vec<u64>> for ServerCount {
    fn from(shards: Vec<u64>) -> Self {
        Self::Shards(shards)
    }
}

/// Body of `POST /bot/{id}`
#[derive(Debug, Serialize)]
pub(crate) struct UpdateCountBody {
    pub server_count: ServerCount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_count_body() {
        let total = UpdateCountBody {
            server_count: 42.into(),
        };
        assert_eq!(
            serde_json::to_value(&total).unwrap(),
            serde_json::json!({ "server_count": 42 })
        );

        let shards = UpdateCountBody {
            server_count: vec![10, 20].into(),
        };
        assert_eq!(
            serde_json::to_value(&shards).unwrap(),
            serde_json::json!({ "server_count": [10, 20] })
        );
    }
}
