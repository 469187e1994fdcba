//! Leaderboards with deterministic tie-breaking
//!
//! Keys are `Option<f64>`: a missing value ranks below every present value.
//! Sorting is stable, so records with equal keys keep their input order.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

type KeyFn<'a, R> = Box<dyn Fn(&R) -> Option<f64> + 'a>;

/// Compound sort key: later keys are only consulted on ties
pub struct Ranker<'a, R> {
    keys: Vec<(KeyFn<'a, R>, Direction)>,
}

impl<'a, R> Ranker<'a, R> {
    pub fn by(key: impl Fn(&R) -> Option<f64> + 'a, direction: Direction) -> Self {
        Self {
            keys: vec![(Box::new(key), direction)],
        }
    }

    pub fn then_by(mut self, key: impl Fn(&R) -> Option<f64> + 'a, direction: Direction) -> Self {
        self.keys.push((Box::new(key), direction));
        self
    }

    fn compare(&self, a: &R, b: &R) -> Ordering {
        self.keys
            .iter()
            .map(|(key, direction)| {
                let ordering = compare_keys(key(a), key(b));
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// All records in rank order
    pub fn rank<'r>(&self, records: impl IntoIterator<Item = &'r R>) -> Vec<&'r R>
    where
        R: 'r,
    {
        let mut ranked: Vec<&'r R> = records.into_iter().collect();
        ranked.sort_by(|a, b| self.compare(a, b));
        ranked
    }

    /// The first `n` records in rank order
    pub fn top_n<'r>(&self, records: impl IntoIterator<Item = &'r R>, n: usize) -> Vec<&'r R>
    where
        R: 'r,
    {
        let mut ranked = self.rank(records);
        ranked.truncate(n);
        ranked
    }
}

fn compare_keys(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// The `n` records with the highest `key`, ties in input order
pub fn top_n<'r, R, F>(records: impl IntoIterator<Item = &'r R>, key: F, n: usize) -> Vec<&'r R>
where
    R: 'r,
    F: Fn(&R) -> Option<f64>,
{
    Ranker::by(key, Direction::Descending).top_n(records, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entry {
        name: &'static str,
        users: Option<u64>,
        rating: f64,
    }

    fn entry(name: &'static str, users: Option<u64>, rating: f64) -> Entry {
        Entry {
            name,
            users,
            rating,
        }
    }

    fn names(ranked: &[&Entry]) -> Vec<&'static str> {
        ranked.iter().map(|e| e.name).collect()
    }

    fn users(e: &Entry) -> Option<f64> {
        e.users.map(|u| u as f64)
    }

    #[test]
    fn top_n_keeps_input_order_on_ties() {
        let records = vec![
            entry("A", Some(5), 0.0),
            entry("B", Some(5), 0.0),
            entry("C", Some(9), 0.0),
        ];

        assert_eq!(names(&top_n(&records, users, 2)), vec!["C", "A"]);
    }

    #[test]
    fn missing_keys_rank_lowest() {
        let records = vec![
            entry("A", None, 0.0),
            entry("B", Some(0), 0.0),
            entry("C", Some(3), 0.0),
        ];

        assert_eq!(names(&top_n(&records, users, 10)), vec!["C", "B", "A"]);
        assert_eq!(
            names(&Ranker::by(users, Direction::Ascending).rank(&records)),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn compound_keys_break_ties_in_order() {
        let records = vec![
            entry("A", Some(10), 4.5),
            entry("B", Some(20), 4.5),
            entry("C", Some(5), 4.9),
            entry("D", Some(20), 4.5),
        ];

        let ranker = Ranker::by(|e: &Entry| Some(e.rating), Direction::Descending)
            .then_by(users, Direction::Descending);

        assert_eq!(names(&ranker.rank(&records)), vec!["C", "B", "D", "A"]);
        assert_eq!(names(&ranker.top_n(&records, 2)), vec!["C", "B"]);
    }

    #[test]
    fn rank_accepts_filtered_iterators() {
        let records = vec![
            entry("A", Some(1), 0.0),
            entry("B", Some(7), 0.0),
            entry("C", Some(3), 0.0),
        ];

        let ranked = top_n(records.iter().filter(|e| e.name != "B"), users, 5);
        assert_eq!(names(&ranked), vec!["C", "A"]);
    }
}
