//! Whole-packet tags keyed by concrete type.

use std::{any::type_name, fmt, sync::Arc};

use super::{Tag, TagError, downcast_arc, downcast_ref, is_type, make_mut};

/// At most one tag per concrete type.
///
/// Cloning a `TagSet` shares the tag objects; [`TagSet::get_mut`] clones a
/// shared tag before handing out a mutable reference.
///
/// # Examples
///
/// ```
/// use wirechunk::TagSet;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct CreationTime(u64);
///
/// let mut tags = TagSet::default();
/// tags.add(CreationTime(5)).unwrap();
/// assert_eq!(tags.find::<CreationTime>(), Some(&CreationTime(5)));
/// assert!(tags.add(CreationTime(6)).is_err());
/// ```
#[derive(Clone, Default)]
pub struct TagSet {
    tags: Vec<Arc<dyn Tag>>,
}

impl TagSet {
    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize { self.tags.len() }

    /// Whether no tag is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.tags.is_empty() }

    /// Remove every tag.
    pub fn clear(&mut self) { self.tags.clear(); }

    fn position<T: Tag>(&self) -> Option<usize> { self.tags.iter().position(is_type::<T>) }

    /// Attach `tag`, returning a mutable reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::AlreadyPresent`] if a `T` is already attached.
    pub fn add<T: Tag>(&mut self, tag: T) -> Result<&mut T, TagError> {
        if self.position::<T>().is_some() {
            return Err(TagError::AlreadyPresent {
                type_name: type_name::<T>(),
            });
        }
        self.tags.push(Arc::new(tag));
        self.get_mut::<T>()
    }

    /// Mutable reference to the `T` tag, attaching a default one if absent.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Absent`] only if the stored tag cannot be
    /// downcast back to `T`.
    pub fn add_if_absent<T: Tag + Default>(&mut self) -> Result<&mut T, TagError> {
        if self.position::<T>().is_none() {
            self.tags.push(Arc::new(T::default()));
        }
        self.get_mut::<T>()
    }

    /// Borrow the `T` tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Absent`] if no `T` is attached.
    pub fn get<T: Tag>(&self) -> Result<&T, TagError> {
        self.find::<T>().ok_or(TagError::Absent {
            type_name: type_name::<T>(),
        })
    }

    /// Borrow the `T` tag, if attached.
    #[must_use]
    pub fn find<T: Tag>(&self) -> Option<&T> { self.tags.iter().find_map(downcast_ref::<T>) }

    /// Mutably borrow the `T` tag, cloning it first if it is shared.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Absent`] if no `T` is attached.
    pub fn get_mut<T: Tag>(&mut self) -> Result<&mut T, TagError> {
        self.find_mut::<T>().ok_or(TagError::Absent {
            type_name: type_name::<T>(),
        })
    }

    /// Mutably borrow the `T` tag if attached, cloning it first if shared.
    pub fn find_mut<T: Tag>(&mut self) -> Option<&mut T> {
        let index = self.position::<T>()?;
        make_mut::<T>(&mut self.tags[index])
    }

    /// Detach and return the `T` tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Absent`] if no `T` is attached.
    pub fn remove<T: Tag>(&mut self) -> Result<Arc<T>, TagError> {
        self.remove_if_present::<T>().ok_or(TagError::Absent {
            type_name: type_name::<T>(),
        })
    }

    /// Detach and return the `T` tag, if attached.
    pub fn remove_if_present<T: Tag>(&mut self) -> Option<Arc<T>> {
        let index = self.position::<T>()?;
        downcast_arc::<T>(&self.tags.remove(index))
    }

    /// Replace the content with the tags of `source`, sharing the tag objects.
    pub fn copy_tags(&mut self, source: &TagSet) { self.tags.clone_from(&source.tags); }

    /// Iterate over the attached tags.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Tag> { self.tags.iter().map(|tag| &**tag) }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_list().entries(self.iter()).finish() }
}
