//! Tags attached to byte ranges of packet data.
//!
//! Entries are kept sorted by offset. Entries of the same tag type never
//! overlap; entries of different types may cover the same bytes. Queries
//! return views trimmed to the requested range and never modify stored
//! entries, while updates split stored entries at the range boundaries so
//! only the covered part changes.

use std::{
    any::{TypeId, type_name},
    fmt,
    sync::Arc,
};

use super::{Tag, TagError, downcast_arc, downcast_ref, is_type, make_mut};

#[derive(Clone)]
struct Entry {
    offset: usize,
    length: usize,
    tag: Arc<dyn Tag>,
}

impl Entry {
    const fn end(&self) -> usize { self.offset + self.length }

    const fn overlaps(&self, offset: usize, end: usize) -> bool { self.offset < end && offset < self.end() }

    fn type_id(&self) -> TypeId { Tag::as_any(&*self.tag).type_id() }

    /// Intersection with `[offset, end)`, if any byte is shared.
    fn trimmed(&self, offset: usize, end: usize) -> Option<(usize, usize)> {
        let start = self.offset.max(offset);
        let stop = self.end().min(end);
        (start < stop).then(|| (start, stop - start))
    }
}

/// A typed view of one tagged region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionTag<T> {
    offset: usize,
    length: usize,
    tag: Arc<T>,
}

impl<T> RegionTag<T> {
    /// Start of the region.
    #[must_use]
    pub const fn offset(&self) -> usize { self.offset }

    /// Length of the region.
    #[must_use]
    pub const fn length(&self) -> usize { self.length }

    /// End of the region, exclusive.
    #[must_use]
    pub const fn end(&self) -> usize { self.offset + self.length }

    /// Borrow the tag.
    #[must_use]
    pub fn tag(&self) -> &T { &self.tag }

    /// Take the shared tag.
    #[must_use]
    pub fn into_tag(self) -> Arc<T> { self.tag }
}

/// Tags attached to `(offset, length)` ranges.
///
/// # Examples
///
/// ```
/// use wirechunk::{RegionTagSet, TagError};
///
/// #[derive(Clone, Debug)]
/// struct Priority(u8);
///
/// let mut tags = RegionTagSet::default();
/// tags.add(0, 1000, Priority(1)).unwrap();
/// assert!(matches!(
///     tags.add(500, 1000, Priority(2)),
///     Err(TagError::Overlapping { .. })
/// ));
/// ```
#[derive(Clone, Default)]
pub struct RegionTagSet {
    entries: Vec<Entry>,
}

impl RegionTagSet {
    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether no entry is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Remove every entry.
    pub fn clear(&mut self) { self.entries.clear(); }

    fn insert(&mut self, entry: Entry) {
        let index = self
            .entries
            .partition_point(|existing| existing.offset <= entry.offset);
        self.entries.insert(index, entry);
    }

    fn exact_index<T: Tag>(&self, offset: usize, length: usize) -> Option<usize> {
        self.entries.iter().position(|entry| {
            entry.offset == offset && entry.length == length && is_type::<T>(&entry.tag)
        })
    }

    fn check_free(&self, type_id: TypeId, type_name: &'static str, offset: usize, length: usize) -> Result<(), TagError> {
        if length == 0 {
            return Err(TagError::EmptyRegion);
        }
        let end = offset
            .checked_add(length)
            .ok_or(TagError::RangeOverflow { offset, length })?;
        if self
            .entries
            .iter()
            .any(|entry| entry.type_id() == type_id && entry.overlaps(offset, end))
        {
            return Err(TagError::Overlapping {
                type_name,
                offset,
                length,
            });
        }
        Ok(())
    }

    /// Attach `tag` to `length` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::EmptyRegion`] for a zero length,
    /// [`TagError::RangeOverflow`] when the range ends past `usize::MAX` and
    /// [`TagError::Overlapping`] if any `T` entry shares a byte with the range.
    pub fn add<T: Tag>(&mut self, offset: usize, length: usize, tag: T) -> Result<(), TagError> {
        self.check_free(TypeId::of::<T>(), type_name::<T>(), offset, length)?;
        self.insert(Entry {
            offset,
            length,
            tag: Arc::new(tag),
        });
        Ok(())
    }

    /// Mutable reference to the `T` tag covering exactly the range,
    /// attaching a default one if the range is untagged.
    ///
    /// # Errors
    ///
    /// Fails like [`RegionTagSet::add`] when the range is partly tagged.
    pub fn add_if_absent<T: Tag + Default>(&mut self, offset: usize, length: usize) -> Result<&mut T, TagError> {
        if self.exact_index::<T>(offset, length).is_none() {
            self.add(offset, length, T::default())?;
        }
        self.get_mut::<T>(offset, length)
    }

    /// Attach clones of `tag` to every part of the range not yet covered by
    /// a `T`, returning the new entries.
    pub fn add_where_absent<T: Tag + Clone>(&mut self, offset: usize, length: usize, tag: &T) -> Vec<RegionTag<T>> {
        let end = offset.saturating_add(length);
        let mut gaps = Vec::new();
        let mut cursor = offset;
        for entry in self
            .entries
            .iter()
            .filter(|entry| is_type::<T>(&entry.tag) && entry.overlaps(offset, end))
        {
            if entry.offset > cursor {
                gaps.push((cursor, entry.offset - cursor));
            }
            cursor = cursor.max(entry.end());
        }
        if cursor < end {
            gaps.push((cursor, end - cursor));
        }
        gaps.into_iter()
            .map(|(offset, length)| {
                let tag = Arc::new(tag.clone());
                self.insert(Entry {
                    offset,
                    length,
                    tag: Arc::clone(&tag) as Arc<dyn Tag>,
                });
                RegionTag { offset, length, tag }
            })
            .collect()
    }

    /// Borrow the `T` tag covering exactly the range.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NoExactMatch`] if no such entry exists.
    pub fn get<T: Tag>(&self, offset: usize, length: usize) -> Result<&T, TagError> {
        self.find::<T>(offset, length)
            .ok_or(TagError::NoExactMatch {
                type_name: type_name::<T>(),
                offset,
                length,
            })
    }

    /// Borrow the `T` tag covering exactly the range, if any.
    #[must_use]
    pub fn find<T: Tag>(&self, offset: usize, length: usize) -> Option<&T> {
        let index = self.exact_index::<T>(offset, length)?;
        downcast_ref::<T>(&self.entries[index].tag)
    }

    /// Mutably borrow the `T` tag covering exactly the range, cloning it
    /// first if shared.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NoExactMatch`] if no such entry exists.
    pub fn get_mut<T: Tag>(&mut self, offset: usize, length: usize) -> Result<&mut T, TagError> {
        let missing = TagError::NoExactMatch {
            type_name: type_name::<T>(),
            offset,
            length,
        };
        let index = self.exact_index::<T>(offset, length).ok_or(missing.clone())?;
        make_mut::<T>(&mut self.entries[index].tag).ok_or(missing)
    }

    /// Detach the `T` tag covering exactly the range.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NoExactMatch`] if no such entry exists.
    pub fn remove<T: Tag>(&mut self, offset: usize, length: usize) -> Result<Arc<T>, TagError> {
        self.remove_if_present::<T>(offset, length)
            .ok_or(TagError::NoExactMatch {
                type_name: type_name::<T>(),
                offset,
                length,
            })
    }

    /// Detach the `T` tag covering exactly the range, if any.
    pub fn remove_if_present<T: Tag>(&mut self, offset: usize, length: usize) -> Option<Arc<T>> {
        let index = self.exact_index::<T>(offset, length)?;
        downcast_arc::<T>(&self.entries.remove(index).tag)
    }

    /// Detach every part of a `T` tag inside the range, keeping the parts
    /// outside it, and return the detached parts.
    pub fn remove_where_present<T: Tag>(&mut self, offset: usize, length: usize) -> Vec<RegionTag<T>> {
        let end = offset.saturating_add(length);
        let matches_type = |entry: &Entry| is_type::<T>(&entry.tag);
        self.split_entries(offset, matches_type);
        self.split_entries(end, matches_type);
        let mut removed = Vec::new();
        self.entries.retain(|entry| {
            let inside = matches_type(entry) && offset <= entry.offset && entry.end() <= end;
            if inside && let Some(tag) = downcast_arc::<T>(&entry.tag) {
                removed.push(RegionTag {
                    offset: entry.offset,
                    length: entry.length,
                    tag,
                });
            }
            !inside
        });
        removed
    }

    /// Every `T` entry overlapping the range, trimmed to it.
    #[must_use]
    pub fn all_tags<T: Tag>(&self, offset: usize, length: usize) -> Vec<RegionTag<T>> {
        let end = offset.saturating_add(length);
        self.entries
            .iter()
            .filter_map(|entry| {
                let (offset, length) = entry.trimmed(offset, end)?;
                let tag = downcast_arc::<T>(&entry.tag)?;
                Some(RegionTag { offset, length, tag })
            })
            .collect()
    }

    /// Call `visit` with the trimmed range and tag of every overlapping `T`.
    pub fn map_all_tags<T: Tag>(&self, offset: usize, length: usize, mut visit: impl FnMut(usize, usize, &T)) {
        let end = offset.saturating_add(length);
        for entry in &self.entries {
            if let Some((start, size)) = entry.trimmed(offset, end)
                && let Some(tag) = downcast_ref::<T>(&entry.tag)
            {
                visit(start, size, tag);
            }
        }
    }

    /// Call `update` on every `T` covering part of the range, after
    /// splitting entries at the range boundaries so bytes outside keep
    /// their old tag.
    pub fn map_all_tags_for_update<T: Tag>(
        &mut self,
        offset: usize,
        length: usize,
        mut update: impl FnMut(usize, usize, &mut T),
    ) {
        let end = offset.saturating_add(length);
        let matches_type = |entry: &Entry| is_type::<T>(&entry.tag);
        self.split_entries(offset, matches_type);
        self.split_entries(end, matches_type);
        for entry in &mut self.entries {
            if entry.overlaps(offset, end)
                && let Some(tag) = make_mut::<T>(&mut entry.tag)
            {
                update(entry.offset, entry.length, tag);
            }
        }
    }

    /// Copy the entries of `source` overlapping `length` bytes at
    /// `source_offset`, trimmed and re-based to `destination_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Overlapping`] and copies nothing if a copied
    /// entry would overlap an existing entry of the same type, and
    /// [`TagError::RangeOverflow`] if a re-based entry would end past
    /// `usize::MAX`.
    pub fn copy_tags(
        &mut self,
        source: &RegionTagSet,
        source_offset: usize,
        destination_offset: usize,
        length: usize,
    ) -> Result<(), TagError> {
        let end = source_offset.saturating_add(length);
        let copies: Vec<Entry> = source
            .entries
            .iter()
            .filter_map(|entry| entry.trimmed(source_offset, end).map(|range| (range, entry)))
            .map(|((start, size), entry)| {
                let offset = destination_offset
                    .checked_add(start - source_offset)
                    .ok_or(TagError::RangeOverflow {
                        offset: destination_offset,
                        length,
                    })?;
                Ok(Entry {
                    offset,
                    length: size,
                    tag: Arc::clone(&entry.tag),
                })
            })
            .collect::<Result<_, TagError>>()?;
        for copy in &copies {
            self.check_free(copy.type_id(), Tag::tag_type_name(&*copy.tag), copy.offset, copy.length)?;
        }
        for copy in copies {
            self.insert(copy);
        }
        Ok(())
    }

    /// Remove every tag from the range, keeping the parts of entries outside
    /// it.
    pub fn clear_tags(&mut self, offset: usize, length: usize) {
        let end = offset.saturating_add(length);
        self.split_entries(offset, |_| true);
        self.split_entries(end, |_| true);
        self.entries
            .retain(|entry| entry.offset < offset || end <= entry.offset);
    }

    /// Move every entry starting at or after `from` by `shift` bytes.
    ///
    /// The caller keeps shifted entries clear of the ones left in place.
    /// Offsets are clamped so every entry still ends at or before
    /// `usize::MAX`.
    pub fn move_tags(&mut self, from: usize, shift: isize) {
        for entry in self.entries.iter_mut().filter(|entry| entry.offset >= from) {
            entry.offset = entry
                .offset
                .saturating_add_signed(shift)
                .min(usize::MAX - entry.length);
        }
        self.entries.sort_by_key(|entry| entry.offset);
    }

    /// Split every entry straddling `offset` into two entries sharing the
    /// tag.
    pub fn split_at(&mut self, offset: usize) { self.split_entries(offset, |_| true); }

    fn split_entries(&mut self, at: usize, filter: impl Fn(&Entry) -> bool) {
        let mut tails = Vec::new();
        for entry in &mut self.entries {
            if entry.offset < at && at < entry.end() && filter(entry) {
                tails.push(Entry {
                    offset: at,
                    length: entry.end() - at,
                    tag: Arc::clone(&entry.tag),
                });
                entry.length = at - entry.offset;
            }
        }
        for tail in tails {
            self.insert(tail);
        }
    }

    /// Iterate over `(offset, length, tag)` for every entry in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &dyn Tag)> {
        self.entries
            .iter()
            .map(|entry| (entry.offset, entry.length, &*entry.tag))
    }
}

impl fmt::Debug for RegionTagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| (entry.offset..entry.end(), &entry.tag)),
            )
            .finish()
    }
}
