use std::any::Any;

use crate::common::{PageItem, Result, VlistError};
use crate::provider::DataProvider;

use super::VirtualizingCollection;

/// Untyped view of a virtualized collection, for binding layers that only
/// deal in `dyn Any` values.
pub trait ErasedList {
    fn len(&mut self) -> Result<usize>;

    fn get_any(&mut self, index: usize) -> Result<Option<Box<dyn Any>>>;

    /// Values of a different type are never found.
    fn index_of_any(&self, value: &dyn Any) -> Option<usize>;

    fn set_any(&mut self, index: usize, value: Box<dyn Any>) -> Result<()>;
}

impl<P> ErasedList for VirtualizingCollection<P>
where
    P: DataProvider,
    P::Item: PageItem + 'static,
{
    fn len(&mut self) -> Result<usize> {
        VirtualizingCollection::len(self)
    }

    fn get_any(&mut self, index: usize) -> Result<Option<Box<dyn Any>>> {
        Ok(self
            .get(index)?
            .map(|item| Box::new(item) as Box<dyn Any>))
    }

    fn index_of_any(&self, value: &dyn Any) -> Option<usize> {
        value
            .downcast_ref::<P::Item>()
            .and_then(|item| self.index_of(item))
    }

    fn set_any(&mut self, _index: usize, _value: Box<dyn Any>) -> Result<()> {
        Err(VlistError::UnsupportedOperation("set"))
    }
}
