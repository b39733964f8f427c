//! Core types for the market resolver

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recommendation code printed on stdout for downstream consumption.
///
/// Conventional meanings (overridable per market via the `codes` map):
/// `p1` = first/YES outcome, `p2` = second/NO outcome,
/// `p3` = unknown / 50-50 / push, `p4` = too early to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    P1,
    P2,
    P3,
    P4,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::P1 => write!(f, "p1"),
            Recommendation::P2 => write!(f, "p2"),
            Recommendation::P3 => write!(f, "p3"),
            Recommendation::P4 => write!(f, "p4"),
        }
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "p1" => Ok(Recommendation::P1),
            "p2" => Ok(Recommendation::P2),
            "p3" => Ok(Recommendation::P3),
            "p4" => Ok(Recommendation::P4),
            other => Err(format!("invalid recommendation code: {}", other)),
        }
    }
}

/// Outcome of evaluating a market question, before mapping to a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First outcome (YES side, team A, threshold crossed)
    First,
    /// Second outcome (NO side, team B, threshold not crossed)
    Second,
    /// Unresolvable on the merits: tie, canceled game, unusable data
    Unknown,
    /// The deciding event has not happened yet
    TooEarly,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::First => write!(f, "FIRST"),
            Outcome::Second => write!(f, "SECOND"),
            Outcome::Unknown => write!(f, "UNKNOWN"),
            Outcome::TooEarly => write!(f, "TOO EARLY"),
        }
    }
}

/// A resolved market: the code to print plus how we got there.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub recommendation: Recommendation,
    /// Human-readable justification for the log
    pub reason: String,
    /// Data source that decided the outcome ("binance", "sportsdataio", ...)
    pub source: &'static str,
}

impl Resolution {
    pub fn new(recommendation: Recommendation, source: &'static str, reason: String) -> Self {
        Self { recommendation, reason, source }
    }
}

/// Threshold comparison direction for price questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above,
    AtOrAbove,
    Below,
    AtOrBelow,
}

impl Comparison {
    /// Evaluate `value <op> threshold` with exact decimal comparison
    pub fn holds(&self, value: Decimal, threshold: Decimal) -> bool {
        match self {
            Comparison::Above => value > threshold,
            Comparison::AtOrAbove => value >= threshold,
            Comparison::Below => value < threshold,
            Comparison::AtOrBelow => value <= threshold,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Above => write!(f, ">"),
            Comparison::AtOrAbove => write!(f, ">="),
            Comparison::Below => write!(f, "<"),
            Comparison::AtOrBelow => write!(f, "<="),
        }
    }
}
