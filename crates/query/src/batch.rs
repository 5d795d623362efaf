//! Batch execution: many paths over one document.
//!
//! Paths whose next segment names one child (an exact key or an index) are
//! grouped by that segment, and every group of a container is located in
//! one pass over its members. Each group then continues from its child with
//! the remaining segments, so a shared prefix is walked once. Any other
//! segment hands its path to the single-path executor.
//!
//! The results are the ones each path would give on its own.

use crate::executor::{Executor, Select, Walk};
use crate::value::Value;
use alloc::vec;
use alloc::vec::Vec;
use hashbrown::HashMap;
use jskim_path::Segment;
use log::trace;

/// One path of a batch and the output slot it fills.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Job<'p> {
    pub slot: usize,
    pub segments: &'p [Segment],
}

/// Jobs that continue through the same child.
struct Group<'p> {
    select: Select<'p>,
    jobs: Vec<Job<'p>>,
}

/// Resolves every job from the root, writing results into `out`. Slots of
/// paths that resolve to nothing are left untouched.
pub(crate) fn execute_many<'a>(exec: &Executor<'a>, jobs: Vec<Job<'_>>, out: &mut [Value<'a>]) {
    resolve_jobs(exec, exec.root(), jobs, out);
}

fn resolve_jobs<'a, 'p>(exec: &Executor<'a>, pos: usize, jobs: Vec<Job<'p>>, out: &mut [Value<'a>]) {
    let mut groups: Vec<Group<'p>> = Vec::new();
    let mut by_select: HashMap<Select<'p>, usize> = HashMap::new();

    for job in jobs {
        let direct = job
            .segments
            .split_first()
            .and_then(|(first, rest)| Select::direct(first).map(|select| (select, rest)));
        match direct {
            Some((select, rest)) => {
                let group = *by_select.entry(select).or_insert_with(|| {
                    groups.push(Group {
                        select,
                        jobs: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[group].jobs.push(Job {
                    slot: job.slot,
                    segments: rest,
                });
            }
            None => out[job.slot] = exec.resolve(pos, job.segments),
        }
    }

    if groups.is_empty() {
        return;
    }

    let targets = locate(exec, pos, &groups);
    for (group, target) in groups.into_iter().zip(targets) {
        if group.jobs.len() > 1 {
            trace!(
                "{} paths share {:?} at byte {}",
                group.jobs.len(),
                group.select,
                pos
            );
        }
        if let Some(child) = target {
            resolve_jobs(exec, child, group.jobs, out);
        }
    }
}

/// Finds the child each group selects in a single pass over the container
/// at `pos`, under the same duplicate-key policy as a single lookup.
fn locate(exec: &Executor<'_>, pos: usize, groups: &[Group<'_>]) -> Vec<Option<usize>> {
    let stop = exec.stops_at_first(pos);
    let mut found = vec![None; groups.len()];
    let mut pending = groups.len();

    let walk = exec.children(pos, |child| {
        for (slot, group) in found.iter_mut().zip(groups) {
            if stop && slot.is_some() {
                continue;
            }
            if exec.selected(group.select, &child) {
                if slot.is_none() {
                    pending -= 1;
                }
                *slot = Some(child.pos);
            }
        }
        !(stop && pending == 0)
    });

    match walk {
        Walk::Stopped | Walk::Ended(_) => found,
        // First-wins lookups keep what they settled before the damage.
        Walk::Malformed if stop => found,
        Walk::Malformed | Walk::NotContainer => vec![None; groups.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jskim_core::{DuplicateKeys, QueryOptions};
    use jskim_path::Path;

    fn run<'a>(json: &'a str, paths: &[&str], options: QueryOptions) -> Vec<Value<'a>> {
        let compiled: Vec<Path> = paths.iter().map(|p| Path::compile(p).unwrap()).collect();
        let exec = Executor::new(json.as_bytes(), options);
        let jobs = compiled
            .iter()
            .enumerate()
            .map(|(slot, path)| Job {
                slot,
                segments: path.segments(),
            })
            .collect();
        let mut out = vec![Value::none(); paths.len()];
        execute_many(&exec, jobs, &mut out);
        out
    }

    fn single<'a>(json: &'a str, path: &str, options: QueryOptions) -> Value<'a> {
        let path = Path::compile(path).unwrap();
        Executor::new(json.as_bytes(), options).resolve_root(path.segments())
    }

    fn assert_equivalent(json: &str, paths: &[&str], options: QueryOptions) {
        let batch = run(json, paths, options);
        for (path, value) in paths.iter().zip(&batch) {
            assert_eq!(*value, single(json, path, options), "path {}", path);
        }
    }

    #[test]
    fn test_shared_prefix() {
        let json = r#"{"a":{"b":1,"d":{"e":true}},"x":[10,20]}"#;
        let out = run(json, &["a.b", "a.c", "a.d.e", "x.1", "x.5"], QueryOptions::default());
        assert_eq!(out[0].int(), 1);
        assert!(!out[1].exists());
        assert!(out[2].bool());
        assert_eq!(out[3].int(), 20);
        assert!(!out[4].exists());
    }

    #[test]
    fn test_repeated_paths() {
        let out = run(r#"{"a":1}"#, &["a", "a", "b"], QueryOptions::default());
        assert_eq!(out[0], out[1]);
        assert_eq!(out[0].int(), 1);
        assert!(!out[2].exists());
    }

    #[test]
    fn test_mixed_segments() {
        let json = r#"{"p":[{"n":"a","t":1},{"n":"b","t":2}],"q":{"k1":5,"k2":6}}"#;
        assert_equivalent(
            json,
            &["p.#", "p.#.n", "p.#[t>1].n", "p.0.n", "q.k*", "*.k2", "p.1.t"],
            QueryOptions::default(),
        );
    }

    #[test]
    fn test_duplicate_keys_match_single_lookups() {
        let json = r#"{"a":{"x":1},"b":2,"a":{"y":3}}"#;
        let paths = ["a.x", "a.y", "b", "a"];
        assert_equivalent(json, &paths, QueryOptions::default());
        let last = QueryOptions::new().with_duplicate_keys(DuplicateKeys::Last);
        assert_equivalent(json, &paths, last);
        assert_eq!(run(json, &paths, last)[1].int(), 3);
    }

    #[test]
    fn test_malformed_container() {
        let json = r#"{"a":1, oops, "b":2}"#;
        let paths = ["a", "b"];
        assert_equivalent(json, &paths, QueryOptions::default());
        let last = QueryOptions::new().with_duplicate_keys(DuplicateKeys::Last);
        assert_equivalent(json, &paths, last);
        assert_eq!(run(json, &paths, QueryOptions::default())[0].int(), 1);
    }

    #[test]
    fn test_case_insensitive_groups() {
        let json = r#"{"Name":"x","name":"y"}"#;
        let options = QueryOptions::new().with_case_insensitive_keys(true);
        assert_equivalent(json, &["NAME", "name", "Name"], options);
    }
}
