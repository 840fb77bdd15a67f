use serde::{Deserialize, Serialize};

/// Populates `NodeInfo` at startup, per §6's node-identifying call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(rename = "clientName")]
    pub client_name: String,
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    #[serde(rename = "networkID")]
    pub network_id: String,
    #[serde(rename = "genesisBlock")]
    pub genesis_block: String,
    #[serde(rename = "nodeID")]
    pub node_id: String,
}
