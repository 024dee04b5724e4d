use crossbeam_utils::sync::WaitGroup;
use parmat::thread_pool::*;
use parmat::{ParmatErrorKind, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

fn spawn_counter<P: ThreadPool>(pool: P) -> Result<()> {
    const TASK_NUM: usize = 20;
    const ADD_COUNT: usize = 1000;

    let wg = WaitGroup::new();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..TASK_NUM {
        let counter = Arc::clone(&counter);
        let wg = wg.clone();
        pool.spawn(move || {
            for _ in 0..ADD_COUNT {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            drop(wg);
        })?;
    }

    wg.wait();
    assert_eq!(counter.load(Ordering::SeqCst), TASK_NUM * ADD_COUNT);
    Ok(())
}

fn spawn_panic_task<P: ThreadPool>() -> Result<()> {
    const TASK_NUM: usize = 1000;

    let pool = P::new(4)?;
    for _ in 0..TASK_NUM {
        pool.spawn(move || {
            // It suppresses flood of panic messages to the console.
            // You may find it useful to comment this out during development.
            panic_control::disable_hook_in_current_thread();

            panic!();
        })?;
    }

    spawn_counter(pool)
}

#[test]
fn shared_queue_thread_pool_spawn_counter() -> Result<()> {
    let pool = SharedQueueThreadPool::new(4)?;
    spawn_counter(pool)
}

#[test]
fn shared_queue_thread_pool_panic_task() -> Result<()> {
    spawn_panic_task::<SharedQueueThreadPool>()
}

#[test]
fn submit_returns_results() -> Result<()> {
    let pool = SharedQueueThreadPool::new(3)?;
    let handles = (0..50u64)
        .map(|i| pool.submit(move || i * 3))
        .collect::<Result<Vec<_>>>()?;

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(i as u64 * 3, handle.join()?);
    }
    Ok(())
}

#[test]
fn submit_reports_panics_and_keeps_workers() -> Result<()> {
    let pool = SharedQueueThreadPool::new(1)?;
    let handle = pool.submit(|| -> u32 {
        panic_control::disable_hook_in_current_thread();
        panic!("chunk exploded");
    })?;

    let err = handle.join().unwrap_err();
    assert_eq!(ParmatErrorKind::TaskPanic, err.kind());

    // the single worker survived the panic
    assert_eq!(1, pool.live_workers());
    assert_eq!(7, pool.submit(|| 7)?.join()?);
    Ok(())
}

#[test]
fn submit_on_empty_pool_fails() -> Result<()> {
    let pool = SharedQueueThreadPool::new(0)?;
    assert_eq!(0, pool.size());
    let err = pool.submit(|| ()).unwrap_err();
    assert_eq!(ParmatErrorKind::EmptyPool, err.kind());

    let pool = SharedQueueThreadPool::new(2)?;
    pool.clear();
    let err = pool.spawn(|| ()).unwrap_err();
    assert_eq!(ParmatErrorKind::EmptyPool, err.kind());
    Ok(())
}

#[test]
fn clear_finishes_running_task_and_abandons_queue() -> Result<()> {
    let pool = SharedQueueThreadPool::new(1)?;
    let (started_tx, started_rx) = mpsc::channel();

    let mut handles = Vec::new();
    for i in 0..10 {
        let started = started_tx.clone();
        handles.push(pool.submit(move || {
            started.send(i).unwrap();
            thread::sleep(Duration::from_millis(200));
            i
        })?);
    }

    // the first task is running, the other nine are queued behind it
    assert_eq!(0, started_rx.recv().unwrap());
    pool.clear();

    assert_eq!(0, pool.size());
    assert_eq!(0, pool.live_workers());

    let mut handles = handles.into_iter();
    assert_eq!(0, handles.next().unwrap().join()?);
    for handle in handles {
        assert_eq!(ParmatErrorKind::TaskAbandoned, handle.join().unwrap_err().kind());
    }

    // clearing twice is harmless
    pool.clear();
    assert_eq!(0, pool.size());
    Ok(())
}

#[test]
fn resize_twice_keeps_requested_size() -> Result<()> {
    const THREADS: usize = 4;

    let pool = SharedQueueThreadPool::new(2)?;
    pool.resize(THREADS)?;
    pool.resize(THREADS)?;
    assert_eq!(THREADS, pool.size());
    assert_eq!(THREADS, pool.live_workers());

    // every task blocks until all of them run, which needs four distinct workers
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            pool.submit(move || {
                barrier.wait();
                let current = thread::current();
                (current.id(), current.name().map(str::to_owned))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut ids = HashSet::new();
    for handle in handles {
        let (id, name) = handle.join()?;
        assert!(name.unwrap().starts_with("parmat-worker-"));
        ids.insert(id);
    }
    assert_eq!(THREADS, ids.len());

    pool.resize(1)?;
    assert_eq!(1, pool.size());
    assert_eq!(1, pool.live_workers());
    Ok(())
}

#[test]
fn resize_discards_queued_tasks() -> Result<()> {
    let pool = SharedQueueThreadPool::new(1)?;
    let (started_tx, started_rx) = mpsc::channel();

    let running = pool.submit(move || {
        started_tx.send(()).unwrap();
        thread::sleep(Duration::from_millis(200));
        "done"
    })?;
    let queued = pool.submit(|| "never")?;

    started_rx.recv().unwrap();
    pool.resize(2)?;

    assert_eq!("done", running.join()?);
    assert_eq!(ParmatErrorKind::TaskAbandoned, queued.join().unwrap_err().kind());
    assert_eq!(2, pool.size());
    assert_eq!("after", pool.submit(|| "after")?.join()?);
    Ok(())
}

#[test]
fn try_join_hands_back_pending_handle() -> Result<()> {
    let pool = SharedQueueThreadPool::new(1)?;
    let (tx, rx) = mpsc::channel::<u32>();
    let handle = pool.submit(move || rx.recv().unwrap() * 2)?;

    let handle = match handle.try_join() {
        Ok(_) => panic!("task cannot have finished before its input arrived"),
        Err(handle) => handle,
    };

    tx.send(21).unwrap();
    assert_eq!(42, handle.join()?);
    Ok(())
}

#[test]
fn dropping_pool_joins_workers() -> Result<()> {
    let counter = Arc::new(AtomicUsize::new(0));
    let (started_tx, started_rx) = mpsc::channel();

    let pool = SharedQueueThreadPool::new(2)?;
    for _ in 0..2 {
        let counter = Arc::clone(&counter);
        let started = started_tx.clone();
        pool.spawn(move || {
            started.send(()).unwrap();
            thread::sleep(Duration::from_millis(100));
            counter.fetch_add(1, Ordering::SeqCst);
        })?;
    }

    started_rx.recv().unwrap();
    started_rx.recv().unwrap();
    drop(pool);

    // both running tasks finished before drop returned
    assert_eq!(2, counter.load(Ordering::SeqCst));
    Ok(())
}
