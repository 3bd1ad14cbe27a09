#![allow(dead_code)]
use std::time::Duration;

use pd_discretization::{
    algs::communicator::ThreadComm,
    discretization::Decomposition,
    ids::GlobalId,
};

pub fn gid(u: u64) -> GlobalId {
    GlobalId::from_u64(u)
}

pub fn gids(us: &[u64]) -> Vec<GlobalId> {
    us.iter().copied().map(GlobalId::from_u64).collect()
}

/// Flatten per-point neighbor lists into a `[k, ids..]` table.
pub fn table_from(lists: &[Vec<u64>]) -> Vec<i64> {
    let mut out = Vec::new();
    for l in lists {
        out.push(l.len() as i64);
        out.extend(l.iter().map(|&v| v as i64));
    }
    out
}

/// A 3D decomposition with positions `[i, i, i]` and unit volumes.
pub fn decomp(owned: &[u64], lists: &[Vec<u64>]) -> Decomposition {
    assert_eq!(owned.len(), lists.len());
    Decomposition {
        dimension: 3,
        global_ids: owned.iter().map(|&v| v as i64).collect(),
        positions: (0..owned.len()).flat_map(|i| [i as f64; 3]).collect(),
        volumes: vec![1.0; owned.len()],
        neighborhood: table_from(lists),
        horizon: None,
    }
}

/// The three-point reference decomposition:
/// 10 -> {21, 22}, 11 -> {}, 12 -> {21}.
pub fn reference_decomp() -> Decomposition {
    decomp(&[10, 11, 12], &[vec![21, 22], vec![], vec![21]])
}

/// Run `f` once per rank of a fresh `ThreadComm` world, each on its own
/// thread, and return the results ordered by rank.
pub fn run_ranks<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&ThreadComm) -> T + Sync,
{
    run_ranks_with_timeout(n, ThreadComm::DEFAULT_TIMEOUT, f)
}

pub fn run_ranks_with_timeout<T, F>(n: usize, timeout: Duration, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&ThreadComm) -> T + Sync,
{
    let comms: Vec<_> = ThreadComm::world(n)
        .into_iter()
        .map(|c| c.with_timeout(timeout))
        .collect();
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = comms.iter().map(|c| s.spawn(move || f(c))).collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}
