//! Blog-wide counters.

blog_repository!(
    /// Repository of the `statistic` table.
    StatisticRepository,
    "statistic"
);
