//! Property checks for `RegionTagSet` range handling.

mod common;

use common::deterministic_runner;
use proptest::{prop_assert, prop_assert_eq, test_runner::TestCaseError};
use wirechunk::{RegionTagSet, TagError};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Label(usize);

#[test]
fn overlapping_ranges_of_one_type_are_rejected() {
    let mut tags = RegionTagSet::default();
    tags.add(0, 1000, Label(1)).expect("first range");
    assert!(matches!(
        tags.add(500, 1000, Label(2)),
        Err(TagError::Overlapping { .. })
    ));
}

#[test]
fn queries_are_clipped_to_the_overlap() {
    let mut runner = deterministic_runner(256);
    let strategy = (1usize..16, 1usize..16, 0usize..64, 1usize..64);
    runner
        .run(&strategy, |(width, count, query_offset, query_length)| {
            let mut tags = RegionTagSet::default();
            for index in 0..count {
                tags.add(index * width, width, Label(index))
                    .map_err(|err| TestCaseError::fail(format!("add failed: {err}")))?;
            }
            let covered = count * width;
            let found = tags.all_tags::<Label>(query_offset, query_length);
            let query_end = query_offset + query_length;
            let overlap = covered.min(query_end).saturating_sub(query_offset);
            prop_assert_eq!(found.iter().map(|tag| tag.length()).sum::<usize>(), overlap);
            for tag in &found {
                prop_assert!(tag.offset() >= query_offset && tag.end() <= query_end);
                prop_assert!(tag.length() > 0);
                prop_assert_eq!(tag.tag().0, tag.offset() / width);
            }
            prop_assert_eq!(tags.len(), count);
            Ok(())
        })
        .expect("region tag queries should be clipped to the query range");
}
