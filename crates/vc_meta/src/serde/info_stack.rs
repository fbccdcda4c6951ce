use alloc::vec::Vec;
use core::fmt;

/// Names of the values being visited by a driver, outermost first.
///
/// Reported through `log` the first time an operation fails.
#[derive(Default)]
pub(crate) struct TypeStack<'r> {
    stack: Vec<&'r str>,
    reported: bool,
}

impl<'r> TypeStack<'r> {
    pub(crate) const fn new() -> Self {
        Self {
            stack: Vec::new(),
            reported: false,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, name: &'r str) {
        self.stack.push(name);
    }

    #[inline]
    pub(crate) fn pop(&mut self) {
        self.stack.pop();
    }

    /// Logs the stack together with `err`, once per operation.
    pub(crate) fn report(&mut self, err: &dyn fmt::Display) {
        if !self.reported {
            self.reported = true;
            log::debug!("{err} (stack: {self:?})");
        }
    }
}

impl fmt::Debug for TypeStack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.stack.iter();

        if let Some(first) = iter.next() {
            write!(f, "`{first}`")?;
        }

        for name in iter {
            write!(f, " -> `{name}`")?;
        }

        Ok(())
    }
}
