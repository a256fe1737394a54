use std::{
    any::type_name,
    collections::{BTreeMap, HashMap},
    hash::Hash,
    sync::mpsc::{Receiver, Sender},
};

use serde::de::DeserializeOwned;

use super::{Category, Reflect, Shape, classify, parse_scalar, read_scalar};
use crate::{RecliError, Result};

/// An ordered collection of reflectable elements.
pub trait List {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Whether the collection has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutable access to the element at `index`.
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Removes the element at `index`, keeping the order of the rest.
    ///
    /// # Errors
    /// Returns `RecliError::StaleBinding` if `index` is out of range.
    fn remove_at(&mut self, index: usize) -> Result<()>;

    /// Runs `visit` against a zero-valued element that is not part of the collection.
    ///
    /// # Errors
    /// Propagates errors from `visit`.
    fn with_prototype(&self, visit: &mut dyn FnMut(&mut dyn Reflect) -> Result<()>) -> Result<()>;

    /// Builds a zero-valued element with `build` and appends it if `build` succeeds.
    ///
    /// # Errors
    /// Propagates errors from `build`; the collection is unchanged in that case.
    fn push_with(&mut self, build: &mut dyn FnMut(&mut dyn Reflect) -> Result<()>) -> Result<()>;

    /// Decodes one element from JSON and appends it.
    ///
    /// # Errors
    /// Returns `RecliError::Deserialization` if the text does not decode.
    fn push_encoded(&mut self, text: &str) -> Result<()>;

    /// Replaces the contents with scalar elements parsed from `items`.
    ///
    /// # Errors
    /// Returns an error if any item fails to parse; the collection is
    /// unchanged in that case.
    fn replace_parsed(&mut self, items: &[String]) -> Result<()>;
}

impl<T> Reflect for Vec<T>
where
    T: Reflect + Default + DeserializeOwned,
{
    fn shape(&mut self) -> Shape<'_> {
        Shape::List(self)
    }
}

impl<T> List for Vec<T>
where
    T: Reflect + Default + DeserializeOwned,
{
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index)
            .map(|element| element as &mut dyn Reflect)
    }

    fn remove_at(&mut self, index: usize) -> Result<()> {
        if index >= Vec::len(self) {
            return Err(RecliError::StaleBinding(format!("item {index}")));
        }
        Vec::remove(self, index);
        Ok(())
    }

    fn with_prototype(&self, visit: &mut dyn FnMut(&mut dyn Reflect) -> Result<()>) -> Result<()> {
        let mut prototype = T::default();
        visit(&mut prototype)
    }

    fn push_with(&mut self, build: &mut dyn FnMut(&mut dyn Reflect) -> Result<()>) -> Result<()> {
        let mut element = T::default();
        build(&mut element)?;
        self.push(element);
        Ok(())
    }

    fn push_encoded(&mut self, text: &str) -> Result<()> {
        let element: T = serde_json::from_str(text)
            .map_err(|e| RecliError::deserialization(type_name::<T>(), e))?;
        self.push(element);
        Ok(())
    }

    fn replace_parsed(&mut self, items: &[String]) -> Result<()> {
        let parsed = items
            .iter()
            .map(|item| parse_scalar::<T>(item))
            .collect::<Result<Vec<T>>>()?;
        *self = parsed;
        Ok(())
    }
}

/// An associative collection with scalar keys and values.
pub trait Map {
    /// Checks that both keys and values are scalars.
    ///
    /// # Errors
    /// Returns `RecliError::UnsupportedKind` naming the non-scalar side.
    fn check(&self) -> Result<()>;

    /// Every entry rendered as text, in the map's own iteration order.
    ///
    /// # Errors
    /// Returns an error if a key or value fails to render.
    fn entries(&self) -> Result<Vec<(String, String)>>;

    /// Value stored under the parsed `key`, rendered as text.
    ///
    /// # Errors
    /// Returns `RecliError::Conversion` if the key does not parse.
    fn lookup(&self, key: &str) -> Result<Option<String>>;

    /// Inserts or replaces the entry for the parsed `key`.
    ///
    /// # Errors
    /// Returns `RecliError::Conversion` if the key or value does not parse.
    fn store(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes the entry for the parsed `key`; absent keys are ignored.
    ///
    /// # Errors
    /// Returns `RecliError::Conversion` if the key does not parse.
    fn discard(&mut self, key: &str) -> Result<()>;
}

fn require_scalar(value: &mut dyn Reflect) -> Result<()> {
    match classify(value)? {
        Category::Scalar(_) | Category::TextScalar => Ok(()),
        _ => Err(RecliError::unsupported(value.type_name())),
    }
}

macro_rules! impl_map {
    ($map:ident, $($bound:path),+) => {
        impl<K, V> Reflect for $map<K, V>
        where
            K: Reflect + Default $(+ $bound)+,
            V: Reflect + Default,
        {
            fn shape(&mut self) -> Shape<'_> {
                Shape::Map(self)
            }
        }

        impl<K, V> Map for $map<K, V>
        where
            K: Reflect + Default $(+ $bound)+,
            V: Reflect + Default,
        {
            fn check(&self) -> Result<()> {
                require_scalar(&mut K::default())?;
                require_scalar(&mut V::default())
            }

            fn entries(&self) -> Result<Vec<(String, String)>> {
                self.iter()
                    .map(|(key, value)| Ok((read_scalar(key)?, read_scalar(value)?)))
                    .collect()
            }

            fn lookup(&self, key: &str) -> Result<Option<String>> {
                let key = parse_scalar::<K>(key)?;
                self.get(&key).map(|value| read_scalar(value)).transpose()
            }

            fn store(&mut self, key: &str, value: &str) -> Result<()> {
                let key = parse_scalar::<K>(key)?;
                let value = parse_scalar::<V>(value)?;
                self.insert(key, value);
                Ok(())
            }

            fn discard(&mut self, key: &str) -> Result<()> {
                let key = parse_scalar::<K>(key)?;
                self.remove(&key);
                Ok(())
            }
        }
    };
}

impl_map!(HashMap, Eq, Hash);
impl_map!(BTreeMap, Ord);

impl<T> Reflect for Sender<T> {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Unsupported(type_name::<Self>())
    }
}

impl<T> Reflect for Receiver<T> {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Unsupported(type_name::<Self>())
    }
}
