//! Tensor wrappers passed between pipeline stages.

use anyhow::Result;
use ndarray::{Array, IxDyn};

/// Model input/output, wrapper over [`Array<f32, IxDyn>`].
///
/// Integer tensors travel as `f32` and are cast back by the engine to the
/// element type the model declares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl From<Vec<f32>> for X {
    fn from(x: Vec<f32>) -> Self {
        Self(Array::from_vec(x).into_dyn())
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self> {
        Ok(Self::from(Array::from_shape_vec(shape, xs)?))
    }
}

/// Ordered collection of named tensors.
#[derive(Debug, Clone, Default)]
pub struct Xs {
    entries: Vec<(String, X)>,
}

impl From<X> for Xs {
    fn from(x: X) -> Self {
        let mut xs = Self::new();
        xs.push(x);
        xs
    }
}

impl Xs {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends an unnamed tensor; it is addressed by position.
    pub fn push(&mut self, x: X) {
        let name = self.entries.len().to_string();
        self.entries.push((name, x));
    }

    pub fn push_kv(&mut self, name: &str, x: X) -> Result<()> {
        if self.get(name).is_some() {
            anyhow::bail!("Tensor `{}` is already present", name);
        }
        self.entries.push((name.to_string(), x));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&X> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, x)| x)
    }

    /// Like [`Xs::get`] but fails with the missing tensor's name.
    pub fn require(&self, name: &str) -> Result<&X> {
        self.get(name).ok_or_else(|| anyhow::anyhow!("Model output `{}` is missing", name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &X> {
        self.entries.iter().map(|(_, x)| x)
    }
}

impl std::ops::Index<usize> for Xs {
    type Output = X;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index].1
    }
}

impl IntoIterator for Xs {
    type Item = X;
    type IntoIter = std::vec::IntoIter<X>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter().map(|(_, x)| x).collect::<Vec<_>>().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup_and_duplicates() {
        let mut xs = Xs::new();
        xs.push_kv("a", X::from(vec![1.0])).unwrap();
        assert!(xs.push_kv("a", X::from(vec![2.0])).is_err());
        assert_eq!(xs.require("a").unwrap()[[0]], 1.0);
        assert!(xs.require("b").is_err());
        assert_eq!(xs.len(), 1);
    }
}
