/// Account-level numbers fetched independently of repository enumeration.
#[derive(Debug, Clone, Default)]
pub struct AccountProfile {
    pub followers: u64,
    pub following: u64,

    /// Contribution totals from the structured contribution query. `None`
    /// when that query failed entirely; the aggregation loop then estimates
    /// both values from its own totals.
    pub contribution_totals: Option<ContributionTotals>,
}

/// Distinct repositories contributed to, and lifetime contribution count.
#[derive(Debug, Clone, Copy)]
pub struct ContributionTotals {
    pub contributed_to: u64,
    pub contributions: u64,
}
