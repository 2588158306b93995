//! Algorithmic core for computing with finitely generated semigroups, monoids,
//! and congruences on them.
//!
//! Three tightly coupled subsystems make up the crate:
//!
//! - [`semigroup::algs::froidure_pin`]: the Froidure-Pin enumeration engine, which
//!   enumerates a finite semigroup from a set of generator elements.
//! - [`coxeter`]: the Todd-Coxeter coset enumerator, which enumerates the cosets
//!   of a congruence on a finitely presented semigroup.
//! - [`dispatcher`]: the congruence dispatcher, which races enumeration
//!   strategies against one another and surfaces the first to finish.
//!
//! [`element`] holds the `ElementOps` contract that concrete element types
//! (such as the bundled [`element::transformation::Transformation`]) must satisfy
//! to be enumerated by a [`semigroup::algs::froidure_pin::FroidurePinEngine`].

pub mod coxeter;
pub mod dispatcher;
pub mod element;
pub mod reporting;
pub mod semigroup;
pub(crate) mod utils;

use std::collections::hash_map::{DefaultHasher, HashMap};
use std::collections::HashSet;
use std::hash::BuildHasherDefault;

/// A type of HashMap that uses a determined seed
pub type DetHashMap<K, V> = HashMap<K, V, BuildHasherDefault<DefaultHasher>>;

/// A type of DetHashSet that uses a determined seed
pub type DetHashSet<K> = HashSet<K, BuildHasherDefault<DefaultHasher>>;
