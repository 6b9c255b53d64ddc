//! Asset Draft
//!
//! Everything the user enters across the wizard before issuance, plus the
//! static catalogues the selections come from.

use crate::utils::{format_grouped, short_address};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetType {
    Equity,
    Debt,
    RealEstate,
}

impl AssetType {
    pub const ALL: [AssetType; 3] = [Self::Equity, Self::Debt, Self::RealEstate];

    /// Card heading in the picker
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Equity => "Equity Digital Assets",
            Self::Debt => "Debt Digital Assets",
            Self::RealEstate => "Real Estate / Private Businesses",
        }
    }

    /// Short name used in the summary
    pub fn label(&self) -> &'static str {
        match self {
            Self::Equity => "Equity",
            Self::Debt => "Debt",
            Self::RealEstate => "Real Estate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Equity => {
                "Represents partial ownership of an asset, project, or company. Holders receive dividends and may participate in decision-making"
            }
            Self::Debt => {
                "Structure your debt instruments like loans, bonds, and more. Investors receive periodic payments until the maturity of the instrument"
            }
            Self::RealEstate => {
                "Convert properties into digital assets, enable fractional ownership, and enhance cash flow with secure blockchain solutions."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fees {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Fast,
    Medium,
    Slow,
}

/// A network the asset can be issued on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    pub id: &'static str,
    pub name: &'static str,
    /// Name shown once the asset has been issued
    pub display_name: &'static str,
    pub symbol: &'static str,
    pub description: &'static str,
    pub fees: Fees,
    pub speed: Speed,
}

pub const NETWORKS: [Network; 4] = [
    Network {
        id: "ethereum",
        name: "ETHEREUM (BSC)",
        display_name: "Ethereum",
        symbol: "ETH (ETH)",
        description: "A decentralized, open-source blockchain with smart contract functionality, known for its robust ecosystem and being the foundation for many decentralized applications (dApps)",
        fees: Fees::High,
        speed: Speed::Medium,
    },
    Network {
        id: "polygon",
        name: "Polygon",
        display_name: "Polygon",
        symbol: "POL (POL)",
        description: "The Polygon network, fully compatible with Ethereum's smart contracts and tooling, offers scalable solutions with high throughput and low transaction costs.",
        fees: Fees::Low,
        speed: Speed::Fast,
    },
    Network {
        id: "binance",
        name: "Binance Smart Chain (BSC)",
        display_name: "Binance Smart Chain",
        symbol: "BNB Smart Chain Token (BNB)",
        description: "A blockchain developed by Binance, offering smart contract functionality and compatibility with the Ethereum Virtual Machine (EVM) for faster and cheaper transactions",
        fees: Fees::Low,
        speed: Speed::Fast,
    },
    Network {
        id: "base",
        name: "BASE mainnet",
        display_name: "BASE Mainnet",
        symbol: "BNB Smart Chain Token (BNB)",
        description: "A Layer 2 scaling solution for Ethereum developed by Coinbase, designed to offer lower transaction costs and improved scalability while maintaining security and decentralization",
        fees: Fees::Low,
        speed: Speed::Fast,
    },
];

pub fn find_network(id: &str) -> Option<&'static Network> {
    NETWORKS.iter().find(|n| n.id == id)
}

pub const VESTING_PERIODS: [&str; 6] = [
    "3 months", "6 months", "1 year", "2 years", "3 years", "5 years",
];

/// The fixed pre-minting checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreMintingItem {
    ApproveToken,
    ApproveCollection,
    DeployCollection,
}

impl PreMintingItem {
    pub const ALL: [PreMintingItem; 3] = [
        Self::ApproveToken,
        Self::ApproveCollection,
        Self::DeployCollection,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::ApproveToken => "Approve Token Symbol",
            Self::ApproveCollection => "Approve Collection",
            Self::DeployCollection => "Deploy Collection",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ApproveToken => {
                "Approve your token symbol with the smart contract. This step ensures your token has a unique identifier in the blockchain."
            }
            Self::ApproveCollection => {
                "Approve your collection parameters. This defines the properties of your asset collection, including maximum supply and transferability."
            }
            Self::DeployCollection => {
                "Deploy your collection to the blockchain. This creates the smart contract that will manage your digital asset."
            }
        }
    }
}

/// Completed checklist items, in completion order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreMintingProgress {
    completed: Vec<PreMintingItem>,
}

impl PreMintingProgress {
    /// Returns false if the item was already complete
    pub fn complete(&mut self, item: PreMintingItem) -> bool {
        if self.completed.contains(&item) {
            return false;
        }
        self.completed.push(item);
        true
    }

    pub fn reset(&mut self) {
        self.completed.clear();
    }

    pub fn is_complete(&self, item: PreMintingItem) -> bool {
        self.completed.contains(&item)
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn all_done(&self) -> bool {
        PreMintingItem::ALL.iter().all(|i| self.is_complete(*i))
    }

    pub fn items(&self) -> &[PreMintingItem] {
        &self.completed
    }

    /// Drop duplicates a hand-edited session may contain
    pub fn dedup(&mut self) {
        let mut seen = Vec::with_capacity(self.completed.len());
        self.completed.retain(|i| {
            if seen.contains(i) {
                false
            } else {
                seen.push(*i);
                true
            }
        });
    }
}

/// Free-text fields of steps 5 and 6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    AssetName,
    AssetSymbol,
    AssetDescription,
    TotalSupply,
    TokenPrice,
    OfferingPercentage,
    VestingPeriod,
}

impl DraftField {
    pub const INFO: [DraftField; 3] = [Self::AssetName, Self::AssetSymbol, Self::AssetDescription];
    pub const DETAILS: [DraftField; 4] = [
        Self::TotalSupply,
        Self::TokenPrice,
        Self::OfferingPercentage,
        Self::VestingPeriod,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AssetName => "Asset Name",
            Self::AssetSymbol => "Asset Symbol",
            Self::AssetDescription => "Asset Description",
            Self::TotalSupply => "Total Supply",
            Self::TokenPrice => "Token Price (USD)",
            Self::OfferingPercentage => "Offering Percentage",
            Self::VestingPeriod => "Vesting Period",
        }
    }

    /// Numeric fields only accept digits and a decimal point
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::TotalSupply | Self::TokenPrice | Self::OfferingPercentage
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetDraft {
    pub asset_type: Option<AssetType>,
    /// Network id from [`NETWORKS`]
    pub network: Option<String>,
    pub asset_name: String,
    pub asset_symbol: String,
    pub asset_description: String,
    pub total_supply: String,
    pub token_price: String,
    pub offering_percentage: String,
    pub vesting_period: String,
    pub accepted_terms: bool,
}

impl AssetDraft {
    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::AssetName => &self.asset_name,
            DraftField::AssetSymbol => &self.asset_symbol,
            DraftField::AssetDescription => &self.asset_description,
            DraftField::TotalSupply => &self.total_supply,
            DraftField::TokenPrice => &self.token_price,
            DraftField::OfferingPercentage => &self.offering_percentage,
            DraftField::VestingPeriod => &self.vesting_period,
        }
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        let slot = match field {
            DraftField::AssetName => &mut self.asset_name,
            DraftField::AssetSymbol => &mut self.asset_symbol,
            DraftField::AssetDescription => &mut self.asset_description,
            DraftField::TotalSupply => &mut self.total_supply,
            DraftField::TokenPrice => &mut self.token_price,
            DraftField::OfferingPercentage => &mut self.offering_percentage,
            DraftField::VestingPeriod => &mut self.vesting_period,
        };
        *slot = value;
    }

    /// Select a network by id. Unknown ids are refused.
    pub fn set_network(&mut self, id: &str) -> bool {
        match find_network(id) {
            Some(n) => {
                self.network = Some(n.id.to_string());
                true
            }
            None => {
                tracing::warn!("Unknown network id '{}'", id);
                false
            }
        }
    }

    pub fn network(&self) -> Option<&'static Network> {
        self.network.as_deref().and_then(find_network)
    }

    fn filled(&self, fields: &[DraftField]) -> bool {
        fields.iter().all(|f| !self.field(*f).trim().is_empty())
    }

    /// Name, symbol and description are all non-blank
    pub fn info_complete(&self) -> bool {
        self.filled(&DraftField::INFO)
    }

    /// Supply, price, offering and vesting are all non-blank
    pub fn details_complete(&self) -> bool {
        self.filled(&DraftField::DETAILS)
    }

    /// supply x price, when both parse as numbers
    pub fn market_cap(&self) -> Option<f64> {
        let supply = parse_number(&self.total_supply)?;
        let price = parse_number(&self.token_price)?;
        Some(supply * price)
    }

    /// Display strings for the summary step
    pub fn summary(&self, wallet_address: Option<&str>) -> AssetSummary {
        const NOT_SPECIFIED: &str = "Not specified";

        let or_placeholder = |s: &str, placeholder: &str| {
            if s.trim().is_empty() {
                placeholder.to_string()
            } else {
                s.to_string()
            }
        };

        let total_supply = match parse_number(&self.total_supply) {
            Some(n) => format!("{} tokens", format_grouped(n, 3)),
            None if self.total_supply.trim().is_empty() => NOT_SPECIFIED.to_string(),
            None => format!("{} tokens", self.total_supply.trim()),
        };
        let token_price = match parse_number(&self.token_price) {
            Some(p) => format!("${:.4} USD", p),
            None if self.token_price.trim().is_empty() => NOT_SPECIFIED.to_string(),
            None => format!("${} USD", self.token_price.trim()),
        };
        let offering_percentage = if self.offering_percentage.trim().is_empty() {
            NOT_SPECIFIED.to_string()
        } else {
            format!("{}%", self.offering_percentage.trim())
        };
        let market_cap = match self.market_cap() {
            Some(cap) => format!("${} USD", format_grouped(cap, 3)),
            None => "Cannot calculate".to_string(),
        };

        AssetSummary {
            asset_type: self
                .asset_type
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| "Not selected".to_string()),
            network: self
                .network()
                .map(|n| n.name.to_string())
                .unwrap_or_else(|| "Not selected".to_string()),
            wallet_address: wallet_address
                .map(short_address)
                .unwrap_or_else(|| "Not connected".to_string()),
            asset_name: or_placeholder(&self.asset_name, NOT_SPECIFIED),
            asset_symbol: or_placeholder(&self.asset_symbol, NOT_SPECIFIED),
            asset_description: or_placeholder(&self.asset_description, "No description provided"),
            total_supply,
            token_price,
            offering_percentage,
            vesting_period: or_placeholder(&self.vesting_period, NOT_SPECIFIED),
            market_cap,
        }
    }
}

/// Parse a numeric form field. Blank and non-numeric input yield `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSummary {
    pub asset_type: String,
    pub network: String,
    pub wallet_address: String,
    pub asset_name: String,
    pub asset_symbol: String,
    pub asset_description: String,
    pub total_supply: String,
    pub token_price: String,
    pub offering_percentage: String,
    pub vesting_period: String,
    pub market_cap: String,
}
