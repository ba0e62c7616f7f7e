//! Metadata attached to whole packets or to byte ranges of packet data.
//!
//! Any `Clone + Debug + Send + Sync + 'static` type can be a tag. Tags are
//! stored type-erased behind `Arc`, so copying a tag set shares the tag
//! objects; mutable access clones a shared tag first.

mod error;
mod region_tag_set;
mod tag_set;

use std::{
    any::{Any, type_name},
    fmt,
    sync::Arc,
};

pub use error::TagError;
pub use region_tag_set::{RegionTag, RegionTagSet};
pub use tag_set::TagSet;

/// A value attachable to a [`TagSet`] or [`RegionTagSet`].
pub trait Tag: Any + fmt::Debug + Send + Sync {
    /// Borrow as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Convert a shared tag for downcasting to its concrete `Arc`.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    /// Clone into a new box.
    fn clone_tag(&self) -> Box<dyn Tag>;
    /// Name of the concrete type.
    fn tag_type_name(&self) -> &'static str;
}

impl<T: Any + Clone + fmt::Debug + Send + Sync> Tag for T {
    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> { self }

    fn clone_tag(&self) -> Box<dyn Tag> { Box::new(self.clone()) }

    fn tag_type_name(&self) -> &'static str { type_name::<T>() }
}

fn is_type<T: Tag>(tag: &Arc<dyn Tag>) -> bool { Tag::as_any(&**tag).is::<T>() }

fn downcast_ref<T: Tag>(tag: &Arc<dyn Tag>) -> Option<&T> { Tag::as_any(&**tag).downcast_ref::<T>() }

fn downcast_arc<T: Tag>(tag: &Arc<dyn Tag>) -> Option<Arc<T>> {
    Tag::into_any_arc(Arc::clone(tag)).downcast::<T>().ok()
}

/// Mutable access to a stored tag, cloning it first when it is shared.
fn make_mut<T: Tag>(tag: &mut Arc<dyn Tag>) -> Option<&mut T> {
    if Arc::get_mut(tag).is_none() {
        *tag = Arc::from(Tag::clone_tag(&**tag));
    }
    Arc::get_mut(tag).and_then(|tag| Tag::as_any_mut(tag).downcast_mut::<T>())
}
