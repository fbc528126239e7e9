//! Static catalog of tiffin subscription plans.
//!
//! The catalog is hardcoded and immutable: six plans across two billing
//! groups. Prices are stored in paise (minor currency units) and the
//! display string is always derived from the numeric amount, so the two
//! can never drift apart.

use std::{fmt, str::FromStr};

use serde::Serialize;

/// Billing group a plan belongs to. Plan listing pages show one group
/// at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanGroup {
    Monthly,
    Weekly,
}

impl PlanGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanGroup::Monthly => "monthly",
            PlanGroup::Weekly => "weekly",
        }
    }
}

impl fmt::Display for PlanGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(PlanGroup::Monthly),
            "weekly" => Ok(PlanGroup::Weekly),
            other => Err(format!("unknown plan group: {other}")),
        }
    }
}

/// A named subscription tier. `price` is in paise and is always a
/// positive multiple of 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    pub duration: &'static str,
    pub meals: &'static str,
    pub price: i64,
    pub group: PlanGroup,
}

impl Plan {
    /// Human-readable rupee amount, derived from `price`.
    pub fn price_display(&self) -> String {
        format_inr(self.price)
    }
}

pub const PLANS: &[Plan] = &[
    Plan {
        id: "basic-monthly",
        name: "Basic Monthly Plan",
        duration: "30 days",
        meals: "1 meal/day",
        price: 299_900,
        group: PlanGroup::Monthly,
    },
    Plan {
        id: "standard-monthly",
        name: "Standard Monthly Plan",
        duration: "30 days",
        meals: "2 meals/day",
        price: 499_900,
        group: PlanGroup::Monthly,
    },
    Plan {
        id: "premium-monthly",
        name: "Premium Monthly Plan",
        duration: "30 days",
        meals: "3 meals/day",
        price: 699_900,
        group: PlanGroup::Monthly,
    },
    Plan {
        id: "basic-weekly",
        name: "Basic Weekly Plan",
        duration: "7 days",
        meals: "1 meal/day",
        price: 79_900,
        group: PlanGroup::Weekly,
    },
    Plan {
        id: "standard-weekly",
        name: "Standard Weekly Plan",
        duration: "7 days",
        meals: "2 meals/day",
        price: 129_900,
        group: PlanGroup::Weekly,
    },
    Plan {
        id: "premium-weekly",
        name: "Premium Weekly Plan",
        duration: "7 days",
        meals: "3 meals/day",
        price: 179_900,
        group: PlanGroup::Weekly,
    },
];

/// Exact-key lookup. Unknown ids return `None`; callers decide whether
/// that means a redirect or an error.
pub fn find(id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|plan| plan.id == id)
}

pub fn all() -> &'static [Plan] {
    PLANS
}

pub fn in_group(group: PlanGroup) -> impl Iterator<Item = &'static Plan> {
    PLANS.iter().filter(move |plan| plan.group == group)
}

/// Formats a paise amount as an Indian-format rupee string:
/// the last three digits stand alone, every group above them is two
/// digits (79_900 → "₹799", 299_900 → "₹2,999", 12_345_600 → "₹1,23,456").
pub fn format_inr(paise: i64) -> String {
    let rupees = paise / 100;
    format!("₹{}", group_indian(rupees))
}

fn group_indian(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let sign = if amount < 0 { "-" } else { "" };
    if digits.len() <= 3 {
        return format!("{sign}{digits}");
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{sign}{},{tail}", groups.join(","))
}
