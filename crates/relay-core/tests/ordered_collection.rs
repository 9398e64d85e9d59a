//! Integration tests for [`ObservableOrderedCollection`].
//!
//! These tests drive the collection through its public API with long
//! pseudo-random sequences of in-bounds `insert` / `move_item` calls and check
//! the positional invariants after every step against a plain `Vec` model.

use std::sync::{Arc, Mutex};

use relay_core::{CollectionChange, IndexError, ObservableOrderedCollection};

/// Small deterministic generator so failures are reproducible without extra crates.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn test_insert_scenario_yields_a_c_b() {
    let mut list = ObservableOrderedCollection::new();
    list.insert(0, "A").unwrap();
    list.insert(1, "B").unwrap();
    list.insert(1, "C").unwrap();

    assert_eq!(list.as_slice(), &["A", "C", "B"]);
    assert_eq!(list.count(), 3);
}

#[test]
fn test_move_scenario_yields_c_b_a() {
    let mut list: ObservableOrderedCollection<_> = ["A", "C", "B"].into_iter().collect();

    list.move_item(0, 2).unwrap();

    assert_eq!(list.as_slice(), &["C", "B", "A"]);
    assert_eq!(list.index_of(&"A"), Some(2));
}

#[test]
fn test_empty_collection_rejects_every_move() {
    let mut list: ObservableOrderedCollection<u32> = ObservableOrderedCollection::new();
    assert_eq!(
        list.move_item(0, 0),
        Err(IndexError::OutOfRange { index: 0, len: 0 })
    );
}

// ── Properties ────────────────────────────────────────────────────────────────

#[test]
fn test_index_of_tracks_every_item_through_random_inserts_and_moves() {
    // Arrange
    let mut rng = Lcg(0x5EED);
    let mut list = ObservableOrderedCollection::new();
    let mut model: Vec<u32> = Vec::new();

    // Act / Assert
    for next_item in 0..400u32 {
        if model.is_empty() || rng.below(3) == 0 {
            let index = rng.below(model.len() + 1);
            list.insert(index, next_item).unwrap();
            model.insert(index, next_item);
        } else {
            let from = rng.below(model.len());
            let to = rng.below(model.len());
            list.move_item(from, to).unwrap();
            let item = model.remove(from);
            model.insert(to, item);
        }

        assert_eq!(list.as_slice(), model.as_slice());
        assert_eq!(list.count(), model.len());
        for (position, item) in model.iter().enumerate() {
            assert_eq!(list.index_of(item), Some(position));
        }
    }
}

#[test]
fn test_move_out_and_back_restores_original_order() {
    let mut rng = Lcg(42);
    let original: Vec<u32> = (0..12).collect();

    for _ in 0..200 {
        // Arrange
        let mut list: ObservableOrderedCollection<u32> = original.iter().copied().collect();
        let a = rng.below(original.len());
        let b = rng.below(original.len());

        // Act
        list.move_item(a, b).unwrap();
        list.move_item(b, a).unwrap();

        // Assert
        assert_eq!(list.as_slice(), original.as_slice(), "move({a},{b}) then move({b},{a})");
    }
}

#[test]
fn test_moved_item_lands_exactly_at_new_index() {
    let mut rng = Lcg(7);
    let mut list: ObservableOrderedCollection<u32> = (0..9).collect();

    for _ in 0..100 {
        let a = rng.below(9);
        let b = rng.below(9);
        let item = *list.get(a).unwrap();

        list.move_item(a, b).unwrap();

        assert_eq!(list.get(b), Some(&item));
        let mut sorted: Vec<u32> = list.iter().copied().collect();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..9).collect::<Vec<_>>(), "no item lost or duplicated");
    }
}

#[test]
fn test_notifications_replay_to_the_same_sequence() {
    // Arrange: a subscriber that rebuilds the list purely from notifications
    let mirror: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&mirror);
    let mut list = ObservableOrderedCollection::new();
    list.subscribe(move |change| {
        let mut m = sink.lock().unwrap();
        match change {
            CollectionChange::Inserted { index, item } => m.insert(*index, **item),
            CollectionChange::Moved {
                old_index,
                new_index,
                ..
            } => {
                let item = m.remove(*old_index);
                m.insert(*new_index, item);
            }
            CollectionChange::Removed { index, .. } => {
                m.remove(*index);
            }
        }
    });

    // Act
    let mut rng = Lcg(99);
    for item in 0..150u32 {
        match rng.below(4) {
            0 | 1 => list.insert(rng.below(list.count() + 1), item).unwrap(),
            2 if !list.is_empty() => {
                let n = list.count();
                list.move_item(rng.below(n), rng.below(n)).unwrap();
            }
            3 if !list.is_empty() => {
                list.remove_at(rng.below(list.count())).unwrap();
            }
            _ => list.push(item),
        }
    }

    // Assert
    assert_eq!(mirror.lock().unwrap().as_slice(), list.as_slice());
}
