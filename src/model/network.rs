/// Chains the lending markets are deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Ethereum,
    Optimism,
    Polygon,
    Base,
    Arbitrum,
    Sepolia,
    BaseSepolia,
    ArbitrumSepolia,
}

impl Network {
    pub const ALL: [Network; 8] = [
        Network::Ethereum,
        Network::Optimism,
        Network::Polygon,
        Network::Base,
        Network::Arbitrum,
        Network::Sepolia,
        Network::BaseSepolia,
        Network::ArbitrumSepolia,
    ];

    pub fn chain_id(self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Optimism => 10,
            Network::Polygon => 137,
            Network::Base => 8453,
            Network::Arbitrum => 42161,
            Network::Sepolia => 11155111,
            Network::BaseSepolia => 84532,
            Network::ArbitrumSepolia => 421614,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Optimism => "optimism",
            Network::Polygon => "polygon",
            Network::Base => "base",
            Network::Arbitrum => "arbitrum",
            Network::Sepolia => "sepolia",
            Network::BaseSepolia => "base-sepolia",
            Network::ArbitrumSepolia => "arbitrum-sepolia",
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Network> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }

    /// Accepts a chain id ("8453") or a name ("Base", "arbitrum_sepolia").
    pub fn parse(s: &str) -> Option<Network> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u64>() {
            return Self::from_chain_id(id);
        }
        let slug = s.to_ascii_lowercase().replace(['_', ' '], "-");
        match slug.as_str() {
            "mainnet" | "eth" => Some(Network::Ethereum),
            "op" => Some(Network::Optimism),
            "matic" => Some(Network::Polygon),
            "arbitrum-one" | "arb" => Some(Network::Arbitrum),
            other => Self::ALL.into_iter().find(|n| n.name() == other),
        }
    }
}

/// Display name for a chain id that may not be one of ours.
pub fn network_name(chain_id: u64) -> &'static str {
    Network::from_chain_id(chain_id).map_or("unknown", Network::name)
}
