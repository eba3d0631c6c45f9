//! Process-wide type factory registry.
//!
//! Maps a type identity to a constructor of a fresh zero value. The model
//! modules register every type that can appear as an ordered-map value
//! during their one-time initialization; the marshaller asks the registry
//! to materialize values when populating such maps. Read-only after
//! initialization and safe to read from any thread.
//!
//! A lookup miss is fatal: it means a model author forgot to register a
//! type, not that user input was bad.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use crate::error::Error;

type Factory = fn() -> Box<dyn Any>;

static REGISTRY: LazyLock<RwLock<HashMap<TypeId, (&'static str, Factory)>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register a zero-value constructor for `T`. Idempotent.
pub fn register<T: Default + Any>() {
    let mut registry = REGISTRY.write().expect("factory registry poisoned");
    registry
        .entry(TypeId::of::<T>())
        .or_insert((type_name::<T>(), || Box::new(T::default())));
}

/// Materialize a fresh zero value of `T` through the registry.
pub fn create<T: Any>() -> Result<T, Error> {
    let boxed = create_by_id(TypeId::of::<T>(), type_name::<T>())?;
    boxed.downcast::<T>().map(|b| *b).map_err(|_| Error::FactoryMiss {
        type_name: type_name::<T>(),
    })
}

/// Materialize a fresh zero value by type identity. `type_name` is used for
/// the error message only.
pub fn create_by_id(id: TypeId, type_name: &'static str) -> Result<Box<dyn Any>, Error> {
    let registry = REGISTRY.read().expect("factory registry poisoned");
    match registry.get(&id) {
        Some((_, factory)) => Ok(factory()),
        None => Err(Error::FactoryMiss { type_name }),
    }
}

/// Whether `T` has been registered; used by initialization assertions.
pub fn is_registered<T: Any>() -> bool {
    REGISTRY
        .read()
        .expect("factory registry poisoned")
        .contains_key(&TypeId::of::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Sample {
        n: u32,
    }

    #[test]
    fn register_is_idempotent_and_create_returns_zero_value() {
        register::<Sample>();
        register::<Sample>();
        let fresh: Sample = create().unwrap();
        assert_eq!(fresh, Sample::default());
    }

    #[test]
    fn unregistered_type_is_a_factory_miss() {
        #[derive(Debug)]
        struct NeverRegistered;
        let err = create::<NeverRegistered>().unwrap_err();
        assert!(matches!(err, Error::FactoryMiss { .. }));
    }
}
