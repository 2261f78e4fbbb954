//! Purchase and sale contracts.

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

use super::Entity;

/// Whether the house buys or sells under a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Purchase,
    Sale,
}

impl ContractType {
    /// Backend value of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Sale => "sale",
        }
    }
}

/// Role a participant plays in a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Buyer,
    Seller,
    Trader,
    Broker,
    #[serde(other)]
    Other,
}

/// A party named on a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Identifier of the referenced buyer, seller or trader.
    #[serde(default)]
    pub people_id: Option<String>,
    pub name: String,
    pub role: ParticipantRole,
}

/// The traded commodity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    #[serde(default, rename = "commodity_id")]
    pub id: Option<String>,
    pub name: String,
}

/// How a price schedule line is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingType {
    /// Flat price agreed up front.
    Fixed,
    /// Basis over a futures price fixed later.
    Basis,
    #[serde(other)]
    Other,
}

/// Pricing terms of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    pub pricing_type: PricingType,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub basis: Option<Decimal>,
    #[serde(default)]
    pub future_price: Option<Decimal>,
    /// Futures contract month the basis refers to.
    #[serde(default)]
    pub option_month: Option<String>,
    #[serde(default)]
    pub option_year: Option<i32>,
}

impl PriceSchedule {
    /// Price per unit.
    ///
    /// A basis line totals `basis + future_price` and is `None` until both are
    /// known. A fixed line falls back to the same sum when no flat price is set.
    pub fn total_price(&self) -> Option<Decimal> {
        let combined = match (self.basis, self.future_price) {
            (Some(basis), Some(future)) => Some(basis + future),
            _ => None,
        };
        match self.pricing_type {
            PricingType::Basis => combined,
            PricingType::Fixed | PricingType::Other => self.price.or(combined),
        }
    }
}

/// Quantity bookkeeping for a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub total: Decimal,
    /// Quantity not yet allocated to sub-contracts.
    #[serde(default)]
    pub open: Decimal,
    #[serde(default)]
    pub fixed: Decimal,
    #[serde(default)]
    pub settled: Decimal,
}

/// A purchase or sale contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(rename = "_id")]
    pub id: String,
    pub folio: String,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub commodity: Commodity,
    #[serde(default)]
    pub participants: Vec<Participant>,
    pub quantity: Decimal,
    #[serde(default)]
    pub measurement_unit: Option<String>,
    #[serde(default)]
    pub price_schedule: Vec<PriceSchedule>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub inventory: Option<Inventory>,
    #[serde(default)]
    pub sub_contracts: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Contract {
    /// First participant with `role`.
    pub fn participant(&self, role: ParticipantRole) -> Option<&Participant> {
        self.participants.iter().find(|p| p.role == role)
    }

    /// The counterparty: the seller of a purchase or the buyer of a sale.
    pub fn counterparty(&self) -> Option<&Participant> {
        match self.contract_type {
            ContractType::Purchase => self.participant(ParticipantRole::Seller),
            ContractType::Sale => self.participant(ParticipantRole::Buyer),
        }
    }

    /// Quantity still open; the full quantity when no inventory is recorded.
    pub fn open_inventory(&self) -> Decimal {
        self.inventory
            .as_ref()
            .map(|inventory| inventory.open)
            .unwrap_or(self.quantity)
    }

    /// Number of sub-contracts drawn from this contract.
    pub fn sub_contract_count(&self) -> usize {
        self.sub_contracts.len()
    }

    /// Unit price of the first schedule line, if priced.
    pub fn unit_price(&self) -> Option<Decimal> {
        self.price_schedule.first().and_then(PriceSchedule::total_price)
    }
}

impl Entity for Contract {
    const PATH: &'static str = "contracts";
    const SEARCH_FIELDS: &'static [&'static str] =
        &["folio", "commodity.name", "participants.name", "status"];

    fn field(key: &str) -> String {
        match key {
            "commodity" => "commodity.name",
            "pricingType" | "pricing_type" => "price_schedule.pricing_type",
            "seller" | "buyer" | "counterparty" => "participants.name",
            "openInventory" | "open_inventory" => "inventory.open",
            "contractType" | "contract_type" => "type",
            "createdAt" | "created" => "created_at",
            other => other,
        }
        .to_string()
    }
}
