use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::models::company::Company;
use crate::models::job::Job;

/// Items ranked featured-first, newest-first.
pub trait FeaturedRecency {
    fn featured(&self) -> bool;
    fn created_at(&self) -> DateTime<Utc>;
}

impl FeaturedRecency for Job {
    fn featured(&self) -> bool {
        self.featured
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl FeaturedRecency for Company {
    fn featured(&self) -> bool {
        self.featured
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub fn featured_then_newest<T: FeaturedRecency>(a: &T, b: &T) -> Ordering {
    b.featured()
        .cmp(&a.featured())
        .then_with(|| b.created_at().cmp(&a.created_at()))
}

/// Stable, so equal items keep their input order.
pub fn sort_featured_first<T: FeaturedRecency>(items: &mut [T]) {
    items.sort_by(featured_then_newest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone)]
    struct Item {
        title: &'static str,
        featured: bool,
        created_at: DateTime<Utc>,
    }

    impl FeaturedRecency for Item {
        fn featured(&self) -> bool {
            self.featured
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn featured_wins_over_recency() {
        let mut items = vec![
            Item { title: "Instructor", featured: false, created_at: day(2024, 1, 1) },
            Item { title: "Coach", featured: true, created_at: day(2023, 1, 1) },
        ];
        sort_featured_first(&mut items);
        let titles: Vec<_> = items.iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["Coach", "Instructor"]);
    }

    #[test]
    fn tiers_are_contiguous_and_newest_first() {
        let mut items = vec![
            Item { title: "a", featured: false, created_at: day(2024, 3, 1) },
            Item { title: "b", featured: true, created_at: day(2022, 5, 1) },
            Item { title: "c", featured: false, created_at: day(2024, 6, 1) },
            Item { title: "d", featured: true, created_at: day(2024, 2, 1) },
            Item { title: "e", featured: false, created_at: day(2021, 1, 1) },
        ];
        sort_featured_first(&mut items);

        for pair in items.windows(2) {
            if !pair[0].featured {
                assert!(!pair[1].featured);
            }
            if pair[0].featured == pair[1].featured {
                assert!(pair[0].created_at >= pair[1].created_at);
            }
        }
        let titles: Vec<_> = items.iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["d", "b", "c", "a", "e"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let when = day(2024, 1, 1);
        let mut items = vec![
            Item { title: "first", featured: false, created_at: when },
            Item { title: "second", featured: false, created_at: when },
        ];
        sort_featured_first(&mut items);
        assert_eq!(items[0].title, "first");
    }
}
