//! Collection helpers over slices and maps

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::hash::Hash;

use dashmap::DashMap;
use indexmap::{IndexMap, IndexSet};

use crate::error::{Error, Result};

/// Containers that can report emptiness.
pub trait Emptiable {
    fn is_empty_container(&self) -> bool;
}

impl<T> Emptiable for [T] {
    fn is_empty_container(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiable for Vec<T> {
    fn is_empty_container(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiable for VecDeque<T> {
    fn is_empty_container(&self) -> bool {
        self.is_empty()
    }
}

impl<T, S> Emptiable for HashSet<T, S> {
    fn is_empty_container(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Emptiable for HashMap<K, V, S> {
    fn is_empty_container(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Emptiable for BTreeMap<K, V> {
    fn is_empty_container(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Emptiable for IndexMap<K, V, S> {
    fn is_empty_container(&self) -> bool {
        self.is_empty()
    }
}

/// Absent counts as empty.
pub fn is_empty<C: Emptiable + ?Sized>(items: Option<&C>) -> bool {
    items.map_or(true, Emptiable::is_empty_container)
}

pub fn is_not_empty<C: Emptiable + ?Sized>(items: Option<&C>) -> bool {
    !is_empty(items)
}

pub fn get_or_default<T: Clone>(items: &[T], index: usize, default: T) -> T {
    items.get(index).cloned().unwrap_or(default)
}

pub fn map_get_or_default<K: Hash + Eq, V: Clone>(map: &HashMap<K, V>, key: &K, default: V) -> V {
    map.get(key).cloned().unwrap_or(default)
}

pub fn first_or_default<T: Clone>(items: &[T], default: T) -> T {
    items.first().cloned().unwrap_or(default)
}

pub fn last_or_default<T: Clone>(items: &[T], default: T) -> T {
    items.last().cloned().unwrap_or(default)
}

pub fn filter<T: Clone>(items: &[T], predicate: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().filter(|item| predicate(item)).cloned().collect()
}

pub fn map<T, R>(items: &[T], mapper: impl Fn(&T) -> R) -> Vec<R> {
    items.iter().map(mapper).collect()
}

pub fn flatten<T, I>(nested: impl IntoIterator<Item = I>) -> Vec<T>
where
    I: IntoIterator<Item = T>,
{
    nested.into_iter().flatten().collect()
}

/// Splits into chunks of `chunk_size`; the last chunk may be shorter.
pub fn partition<T: Clone>(items: &[T], chunk_size: usize) -> Result<Vec<Vec<T>>> {
    if chunk_size == 0 {
        return Err(Error::validation("Chunk size must be greater than 0"));
    }
    Ok(items.chunks(chunk_size).map(<[T]>::to_vec).collect())
}

/// Entries of `right` replace those of `left`.
pub fn merge_maps<K: Hash + Eq, V>(left: HashMap<K, V>, right: HashMap<K, V>) -> HashMap<K, V> {
    let mut merged = left;
    merged.extend(right);
    merged
}

/// Resolves key collisions with `combine(left_value, right_value)`.
pub fn merge_maps_with<K: Hash + Eq, V>(
    left: HashMap<K, V>,
    right: HashMap<K, V>,
    combine: impl Fn(V, V) -> V,
) -> HashMap<K, V> {
    let mut merged = left;
    for (key, value) in right {
        let next = match merged.remove(&key) {
            Some(existing) => combine(existing, value),
            None => value,
        };
        merged.insert(key, next);
    }
    merged
}

/// Later items win on duplicate keys.
pub fn to_map<T, K: Hash + Eq, V>(
    items: &[T],
    key_fn: impl Fn(&T) -> K,
    value_fn: impl Fn(&T) -> V,
) -> HashMap<K, V> {
    items.iter().map(|item| (key_fn(item), value_fn(item))).collect()
}

/// Keys keep first-seen order; values keep item order.
pub fn to_multimap<T, K: Hash + Eq, V>(
    items: &[T],
    key_fn: impl Fn(&T) -> K,
    value_fn: impl Fn(&T) -> V,
) -> IndexMap<K, Vec<V>> {
    let mut out: IndexMap<K, Vec<V>> = IndexMap::new();
    for item in items {
        out.entry(key_fn(item)).or_default().push(value_fn(item));
    }
    out
}

pub fn group_by<T: Clone, K: Hash + Eq>(items: &[T], key_fn: impl Fn(&T) -> K) -> IndexMap<K, Vec<T>> {
    to_multimap(items, key_fn, T::clone)
}

/// First occurrence wins, order kept.
pub fn distinct<T: Hash + Eq + Clone>(items: &[T]) -> Vec<T> {
    let set: IndexSet<T> = items.iter().cloned().collect();
    set.into_iter().collect()
}

pub fn distinct_by<T: Clone, K: Hash + Eq>(items: &[T], key_fn: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(key_fn(item)))
        .cloned()
        .collect()
}

pub fn join<T: Display>(items: &[T], delimiter: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Set operations keep the order of the first argument, then the second.
pub fn intersection<T: Hash + Eq + Clone>(left: &[T], right: &[T]) -> IndexSet<T> {
    let right: HashSet<&T> = right.iter().collect();
    left.iter().filter(|item| right.contains(item)).cloned().collect()
}

pub fn union<T: Hash + Eq + Clone>(left: &[T], right: &[T]) -> IndexSet<T> {
    left.iter().chain(right.iter()).cloned().collect()
}

pub fn difference<T: Hash + Eq + Clone>(left: &[T], right: &[T]) -> IndexSet<T> {
    let right: HashSet<&T> = right.iter().collect();
    left.iter().filter(|item| !right.contains(item)).cloned().collect()
}

pub fn reverse<T: Clone>(items: &[T]) -> Vec<T> {
    items.iter().rev().cloned().collect()
}

/// True for an empty slice.
pub fn all_match<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> bool {
    items.iter().all(predicate)
}

pub fn any_match<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> bool {
    items.iter().any(predicate)
}

pub fn none_match<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> bool {
    !items.iter().any(predicate)
}

pub fn take<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items.iter().take(n).cloned().collect()
}

pub fn skip<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items.iter().skip(n).cloned().collect()
}

/// Pairs items up to the shorter length.
pub fn zip<T: Clone, U: Clone>(left: &[T], right: &[U]) -> Vec<(T, U)> {
    left.iter().cloned().zip(right.iter().cloned()).collect()
}

pub fn concurrent_map<K: Hash + Eq, V>() -> DashMap<K, V> {
    DashMap::new()
}
