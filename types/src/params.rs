//! Protocol parameters: identities and the disbursement policy.
//!
//! Every field carries a serde default so a partial TOML table is enough to
//! configure a deployment.

use crate::address::Address;
use crate::amount::{NmrAmount, NMR_UNIT};
use crate::error::TypesError;
use crate::time::WEEK_SECS;
use serde::{Deserialize, Serialize};

/// Quota available during the first disbursement period: 1.5M NMR.
pub const DEFAULT_INITIAL_DISBURSEMENT: NmrAmount = NmrAmount::from_nmr(1_500_000);

/// Quota for every later period: 5M NMR a year spread over 52 weeks.
pub const DEFAULT_WEEKLY_DISBURSEMENT: NmrAmount =
    NmrAmount::new(5_000_000 * NMR_UNIT / 52); // 96_153_846_153_846_153_846_153

/// Hard cap on total supply: 21M NMR.
pub const DEFAULT_SUPPLY_CAP: NmrAmount = NmrAmount::from_nmr(21_000_000);

/// Addresses whose numeric value is at or below this are assignable deposit slots.
pub const DEFAULT_DEPOSIT_ADDRESS_LIMIT: u64 = 1_000_000;

/// All protocol parameters fixed at deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    // ── Identities ───────────────────────────────────────────────────────
    /// The single operator that mints, stakes on behalf of participants and
    /// resolves stakes.
    #[serde(default = "default_operator")]
    pub operator: Address,

    /// Operator-controlled pooling account. Receives mints and deposit sweeps.
    #[serde(default = "default_pool")]
    pub pool: Address,

    /// The two governance identities whose joint approval swaps the delegate.
    #[serde(default = "default_governance")]
    pub governance: [Address; 2],

    // ── Disbursement ─────────────────────────────────────────────────────
    /// Quota for period 0.
    #[serde(default = "default_initial_disbursement")]
    pub initial_disbursement: NmrAmount,

    /// Quota for each period after the first.
    #[serde(default = "default_weekly_disbursement")]
    pub weekly_disbursement: NmrAmount,

    /// Length of one disbursement period in seconds.
    #[serde(default = "default_period_secs")]
    pub disbursement_period_secs: u64,

    /// Maximum total supply. `None` disables the cap, written as
    /// `supply_cap = "none"` in TOML.
    #[serde(default = "default_supply_cap", with = "supply_cap_serde")]
    pub supply_cap: Option<NmrAmount>,

    // ── Deposits ─────────────────────────────────────────────────────────
    /// Highest numeric address treated as an assignable deposit slot.
    #[serde(default = "default_deposit_address_limit")]
    pub deposit_address_limit: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_operator() -> Address {
    Address::new([
        0x9d, 0xd5, 0xc4, 0x7c, 0xda, 0x2c, 0xcf, 0x0c, 0x0f, 0x69, 0xe5, 0xe6, 0xa6, 0x4a, 0x4d,
        0xc3, 0x9c, 0x5b, 0xf4, 0xb1,
    ])
}

fn default_pool() -> Address {
    Address::new([
        0x17, 0x76, 0xe1, 0xf2, 0x6f, 0x98, 0xb1, 0xa5, 0xdf, 0x9c, 0xd3, 0x47, 0x95, 0x3a, 0x26,
        0xdd, 0x3c, 0xb4, 0x66, 0x71,
    ])
}

fn default_governance() -> [Address; 2] {
    [
        Address::new([
            0x54, 0xfd, 0x80, 0xd6, 0xae, 0x75, 0x84, 0xd8, 0xe9, 0xa1, 0x9f, 0xe1, 0xdf, 0x43,
            0xf0, 0x4e, 0x52, 0x82, 0xcc, 0x43,
        ]),
        Address::new([
            0xa6, 0xd1, 0x35, 0xde, 0x4a, 0xcf, 0x44, 0xf3, 0x4e, 0x2e, 0x14, 0xa4, 0xee, 0x61,
            0x9c, 0xe0, 0xa9, 0x9d, 0x1e, 0x08,
        ]),
    ]
}

fn default_initial_disbursement() -> NmrAmount {
    DEFAULT_INITIAL_DISBURSEMENT
}

fn default_weekly_disbursement() -> NmrAmount {
    DEFAULT_WEEKLY_DISBURSEMENT
}

fn default_period_secs() -> u64 {
    WEEK_SECS
}

fn default_supply_cap() -> Option<NmrAmount> {
    Some(DEFAULT_SUPPLY_CAP)
}

fn default_deposit_address_limit() -> u64 {
    DEFAULT_DEPOSIT_ADDRESS_LIMIT
}

// ── Supply cap encoding ────────────────────────────────────────────────

/// TOML has no null, so an absent cap is spelled out as `"none"` in
/// human-readable formats. Binary formats keep the plain `Option` encoding.
mod supply_cap_serde {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::amount::NmrAmount;

    pub const UNCAPPED: &str = "none";

    pub fn serialize<S: Serializer>(
        cap: &Option<NmrAmount>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        if !serializer.is_human_readable() {
            return cap.serialize(serializer);
        }
        match cap {
            Some(amount) => amount.serialize(serializer),
            None => serializer.serialize_str(UNCAPPED),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NmrAmount>, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(CapVisitor)
        } else {
            Option::<NmrAmount>::deserialize(deserializer)
        }
    }

    struct CapVisitor;

    impl<'de> Visitor<'de> for CapVisitor {
        type Value = Option<NmrAmount>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "an amount or \"{UNCAPPED}\"")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            if v.eq_ignore_ascii_case(UNCAPPED) {
                return Ok(None);
            }
            v.parse::<NmrAmount>().map(Some).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(NmrAmount::new(u128::from(v))))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
            Ok(Some(NmrAmount::new(v)))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u128::try_from(v)
                .map(|raw| Some(NmrAmount::new(raw)))
                .map_err(|_| E::custom("supply cap must be non-negative"))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(
            self,
            deserializer: D,
        ) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ProtocolParams {
    /// Whether `address` is one of the two governance identities.
    pub fn is_governance(&self, address: &Address) -> bool {
        self.governance.contains(address)
    }

    /// Whether `address` is an assignable deposit slot.
    pub fn is_deposit_address(&self, address: &Address) -> bool {
        address.is_numeric_at_most(self.deposit_address_limit)
    }

    /// Reject parameter sets the ledger cannot operate under.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.disbursement_period_secs == 0 {
            return Err(TypesError::InvalidParams(
                "disbursement_period_secs must be non-zero".into(),
            ));
        }
        if self.weekly_disbursement > self.initial_disbursement {
            return Err(TypesError::InvalidParams(
                "weekly_disbursement must not exceed initial_disbursement".into(),
            ));
        }
        if self.governance[0] == self.governance[1] {
            return Err(TypesError::InvalidParams(
                "governance identities must be distinct".into(),
            ));
        }
        if self.is_governance(&self.operator) {
            return Err(TypesError::InvalidParams(
                "operator must not be a governance identity".into(),
            ));
        }
        if self.is_deposit_address(&self.pool) {
            return Err(TypesError::InvalidParams(
                "pool must not be an assignable deposit address".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            operator: default_operator(),
            pool: default_pool(),
            governance: default_governance(),
            initial_disbursement: default_initial_disbursement(),
            weekly_disbursement: default_weekly_disbursement(),
            disbursement_period_secs: default_period_secs(),
            supply_cap: default_supply_cap(),
            deposit_address_limit: default_deposit_address_limit(),
        }
    }
}
