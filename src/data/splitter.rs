// ============================================================
// Layer 4: Row Shuffle and Train/Test Splitter
// ============================================================
// Two steps, both deterministic:
//
//   shuffle_rows(table, seed)
//     Optional. Fisher-Yates permutation of whole rows driven by
//     a StdRng seeded from the run's seed, so the same seed always
//     gives the same order.
//
//   split_at(table, n_train)
//     Prefix/suffix split: rows [0, n_train) train, the rest test.
//     n_train larger than the table puts everything in training.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::table::{FeatureTable, Partition};

/// Return `table` with its rows permuted by a seeded shuffle.
pub fn shuffle_rows(table: FeatureTable, seed: u64) -> FeatureTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..table.rows()).collect();
    order.shuffle(&mut rng);

    tracing::debug!("Shuffled {} rows with seed {}", order.len(), seed);
    table.select(&order)
}

/// Split `table` into the first `n_train` rows and the remainder.
pub fn split_at(table: FeatureTable, n_train: usize) -> Partition {
    let total    = table.rows();
    let split_at = n_train.min(total);

    let train: Vec<usize> = (0..split_at).collect();
    let test:  Vec<usize> = (split_at..total).collect();

    tracing::debug!(
        "Dataset split: {} training, {} testing",
        train.len(),
        test.len(),
    );

    Partition {
        train: table.select(&train),
        test:  table.select(&test),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(rows: usize) -> FeatureTable {
        let mut t = FeatureTable::new(1);
        for i in 0..rows {
            t.push_row(&[i as f32], (i % 2) as f32);
        }
        t
    }

    #[test]
    fn test_correct_split_sizes() {
        let p = split_at(numbered(100), 80);
        assert_eq!(p.train.rows(), 80);
        assert_eq!(p.test.rows(),  20);
    }

    #[test]
    fn test_split_is_prefix_and_suffix() {
        let p = split_at(numbered(10), 7);
        let train: Vec<f32> = p.train.column(0).collect();
        let test:  Vec<f32> = p.test.column(0).collect();
        assert_eq!(train, (0..7).map(|i| i as f32).collect::<Vec<_>>());
        assert_eq!(test,  vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_all_rows_preserved() {
        let p = split_at(numbered(50), 35);
        assert_eq!(p.total_rows(), 50);
    }

    #[test]
    fn test_oversized_split_keeps_everything_for_training() {
        let p = split_at(numbered(10), 25);
        assert_eq!(p.train.rows(), 10);
        assert!(p.test.is_empty());
    }

    #[test]
    fn test_shuffle_is_seeded_permutation() {
        let a = shuffle_rows(numbered(20), 1234);
        let b = shuffle_rows(numbered(20), 1234);
        assert_eq!(a, b);

        let mut seen: Vec<f32> = a.column(0).collect();
        seen.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert_eq!(seen, (0..20).map(|i| i as f32).collect::<Vec<_>>());

        // labels travel with their rows
        for i in 0..a.rows() {
            assert_eq!(a.label(i), (a.row(i)[0] as usize % 2) as f32);
        }
    }
}
