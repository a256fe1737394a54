use std::{cell::RefCell, fmt, rc::Rc};

use super::{Reflect, list_mut, with_record};
use crate::{RecliError, Result};

type Accessor = dyn Fn(&mut dyn FnMut(&mut dyn Reflect) -> Result<()>) -> Result<()>;

fn accessor<F>(access: F) -> Rc<Accessor>
where
    F: Fn(&mut dyn FnMut(&mut dyn Reflect) -> Result<()>) -> Result<()> + 'static,
{
    Rc::new(access)
}

/// A live handle to one field or element of a caller-owned record.
///
/// A binding is a chain of accessor closures rooted at the caller's
/// `Rc<RefCell<_>>`. Every use borrows the root, walks the chain to the
/// target value and releases the borrow again, so mutations land in the
/// caller's value and nothing is cached between uses.
#[derive(Clone)]
pub struct Binding {
    access: Rc<Accessor>,
    mutable: bool,
    path: String,
}

impl Binding {
    /// Binds the whole value owned by `root`.
    pub fn root<T: Reflect + 'static>(root: Rc<RefCell<T>>) -> Self {
        Self {
            access: accessor(move |visit| {
                let mut value = root.try_borrow_mut().map_err(|_| RecliError::Borrowed)?;
                visit(&mut *value)
            }),
            mutable: true,
            path: String::new(),
        }
    }

    /// Binds the field called `name` of the record this binding points at.
    pub fn field(&self, name: &'static str) -> Self {
        let parent = self.clone();
        let path = self.child_path(name);
        let missing = path.clone();

        Self {
            access: accessor(move |visit| {
                parent.with(|value| {
                    with_record(value, |record| {
                        let field = record
                            .field_mut(name)
                            .ok_or_else(|| RecliError::StaleBinding(missing.clone()))?;
                        visit(field)
                    })
                })
            }),
            mutable: self.mutable,
            path,
        }
    }

    /// Binds the element at `index` of the list this binding points at.
    pub fn element(&self, index: usize) -> Self {
        let parent = self.clone();
        let path = self.child_path(&index.to_string());
        let missing = path.clone();

        Self {
            access: accessor(move |visit| {
                parent.with(|value| {
                    let element = list_mut(value)?
                        .element_mut(index)
                        .ok_or_else(|| RecliError::StaleBinding(missing.clone()))?;
                    visit(element)
                })
            }),
            mutable: self.mutable,
            path,
        }
    }

    /// The same binding without write access.
    pub fn read_only(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// Whether leaves bound here may write the value.
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Dotted path from the root, e.g. `backends.0.port`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Runs `f` against the bound value.
    ///
    /// # Errors
    /// Returns `RecliError::Borrowed` if the root is borrowed elsewhere,
    /// `RecliError::StaleBinding` if the target no longer exists, or any
    /// error from `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn Reflect) -> Result<R>) -> Result<R> {
        let mut f = Some(f);
        let mut output = None;
        (self.access)(&mut |value: &mut dyn Reflect| {
            if let Some(f) = f.take() {
                output = Some(f(value)?);
            }
            Ok(())
        })?;
        output.ok_or_else(|| RecliError::StaleBinding(self.path.clone()))
    }

    fn child_path(&self, segment: &str) -> String {
        if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{segment}", self.path)
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("path", &self.path)
            .field("mutable", &self.mutable)
            .finish()
    }
}
