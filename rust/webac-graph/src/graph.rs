use std::sync::Arc;

use crate::{Resource, ResourceId, Transaction, WebacGraphError};

/// A [ResourceGraph] is a facade over the repository's resource store that is
/// capable of retrieving resources by [ResourceId]. Reads that carry a
/// [Transaction] must observe that transaction's uncommitted writes.
pub trait ResourceGraph: Send + Sync {
    /// Retrieve the resource stored at `id`, or
    /// [`WebacGraphError::NotFound`] if there is none
    fn resource(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Resource, WebacGraphError>;

    /// List the identifiers of the resources directly contained by `id`
    fn children(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Vec<ResourceId>, WebacGraphError>;
}

impl<T> ResourceGraph for Arc<T>
where
    T: ResourceGraph + ?Sized,
{
    fn resource(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Resource, WebacGraphError> {
        self.as_ref().resource(transaction, id)
    }

    fn children(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Vec<ResourceId>, WebacGraphError> {
        self.as_ref().children(transaction, id)
    }
}

impl<T> ResourceGraph for &T
where
    T: ResourceGraph + ?Sized,
{
    fn resource(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Resource, WebacGraphError> {
        (**self).resource(transaction, id)
    }

    fn children(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Vec<ResourceId>, WebacGraphError> {
        (**self).children(transaction, id)
    }
}
