//! Call-chain tracing for instrumented operations.
//!
//! Every instrumented operation pushes its name onto a scoped call stack and
//! pops it on the way out, fault or not, so log lines can carry a dotted
//! label like `upload_folder.upload_file > start`. The stack lives in a
//! `tokio::task_local!` scope in async code (it travels with the task across
//! worker threads) and in a plain thread local otherwise.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;

use log::{debug, error};

use super::report;

/// Name pushed by internal wrapper layers (retry, lease setup). Elided from
/// chain labels and from rendered tracebacks.
pub const WRAPPER_FRAME: &str = "wrapped";

#[derive(Default)]
struct TraceState {
    frames: Vec<&'static str>,
    /// Set once a fault has been logged, so outer layers do not re-log it.
    reported: bool,
    /// Frames captured at the deepest wrapper that gave up on a fault.
    snapshot: Option<Vec<String>>,
}

tokio::task_local! {
    static TASK_TRACE: RefCell<TraceState>;
}

thread_local! {
    static THREAD_TRACE: RefCell<TraceState> = RefCell::new(TraceState::default());
}

/// Runs `f` against whichever trace state is in scope.
fn with_state<R>(f: impl FnOnce(&mut TraceState) -> R) -> R {
    let mut f = Some(f);
    match TASK_TRACE.try_with(|state| (f.take().unwrap())(&mut state.borrow_mut())) {
        Ok(out) => out,
        Err(_) => THREAD_TRACE.with(|state| (f.take().unwrap())(&mut state.borrow_mut())),
    }
}

/// Guard for one call-stack entry; popping happens on drop so the stack
/// stays balanced even when the operation faults.
pub struct CallFrame {
    _private: (),
}

impl CallFrame {
    pub fn enter(name: &'static str) -> Self {
        with_state(|state| state.frames.push(name));
        CallFrame { _private: () }
    }

    /// Sentinel entry for internal wrapper layers.
    pub fn wrapper() -> Self {
        Self::enter(WRAPPER_FRAME)
    }
}

impl Drop for CallFrame {
    fn drop(&mut self) {
        with_state(|state| {
            state.frames.pop();
            if state.frames.is_empty() {
                state.reported = false;
                state.snapshot = None;
            }
        });
    }
}

/// Current stack depth, wrapper frames included.
pub fn depth() -> usize {
    with_state(|state| state.frames.len())
}

/// Dotted label of the current call chain, wrapper frames elided.
pub fn chain() -> String {
    with_state(|state| {
        state
            .frames
            .iter()
            .filter(|name| **name != WRAPPER_FRAME)
            .copied()
            .collect::<Vec<_>>()
            .join(".")
    })
}

/// Snapshot of all frames, outermost first, wrapper frames included.
pub fn capture() -> Vec<String> {
    with_state(|state| state.frames.iter().map(|name| name.to_string()).collect())
}

/// Records the frames at the point a wrapper gives up on a fault, so the
/// error log can show where the fault was raised rather than where it was
/// observed.
pub fn snapshot_frames() {
    let frames = capture();
    with_state(|state| state.snapshot = Some(frames));
}

/// Called by wrapper layers when they consume a fault (retry), so the next
/// fault gets reported again.
pub fn fault_handled() {
    with_state(|state| {
        state.reported = false;
        state.snapshot = None;
    });
}

/// Marks the current fault as reported; returns false if it already was.
fn first_report() -> bool {
    with_state(|state| !std::mem::replace(&mut state.reported, true))
}

fn take_snapshot() -> Option<Vec<String>> {
    with_state(|state| state.snapshot.take())
}

fn log_start(label: &str) {
    debug!("{} > start", label);
}

fn log_finish(label: &str) {
    debug!("{} > finish", label);
}

fn log_error(label: &str, args: &dyn fmt::Debug, fault: &dyn fmt::Display) {
    if first_report() {
        let frames = take_snapshot().unwrap_or_else(capture);
        let trace = report::render(&frames, fault);
        error!("{} > error, with args={:?}\n{}", label, args, trace);
    }
}

/// Instruments a synchronous operation: start/finish/error logging plus a
/// balanced call-stack entry. The fault propagates unchanged.
pub fn traced<T, E, A, F>(name: &'static str, args: A, op: F) -> Result<T, E>
where
    E: fmt::Display,
    A: fmt::Debug,
    F: FnOnce() -> Result<T, E>,
{
    let _frame = CallFrame::enter(name);
    let label = chain();
    log_start(&label);
    match op() {
        Ok(value) => {
            log_finish(&label);
            Ok(value)
        }
        Err(fault) => {
            log_error(&label, &args, &fault);
            Err(fault)
        }
    }
}

async fn instrumented<T, E, A, Fut>(name: &'static str, args: A, fut: Fut) -> Result<T, E>
where
    E: fmt::Display,
    A: fmt::Debug,
    Fut: Future<Output = Result<T, E>>,
{
    let _frame = CallFrame::enter(name);
    let label = chain();
    log_start(&label);
    match fut.await {
        Ok(value) => {
            log_finish(&label);
            Ok(value)
        }
        Err(fault) => {
            log_error(&label, &args, &fault);
            Err(fault)
        }
    }
}

/// Async counterpart of [`traced`]. The outermost call establishes the
/// task-local trace scope; nested calls reuse it.
pub async fn traced_async<T, E, A, F, Fut>(name: &'static str, args: A, op: F) -> Result<T, E>
where
    E: fmt::Display,
    A: fmt::Debug,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if TASK_TRACE.try_with(|_| ()).is_ok() {
        instrumented(name, args, op()).await
    } else {
        TASK_TRACE
            .scope(RefCell::new(TraceState::default()), instrumented(name, args, op()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail() -> Result<(), String> {
        Err("Something is wrong.".to_string())
    }

    #[test]
    fn depth_restored_after_success() {
        let before = depth();
        let result: Result<i32, String> = traced("outer", (), || {
            assert_eq!(depth(), before + 1);
            Ok(3)
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(depth(), before);
    }

    #[test]
    fn depth_restored_after_fault() {
        let before = depth();
        let result = traced("outer", (true, 5), fail);
        assert!(result.is_err());
        assert_eq!(depth(), before);
    }

    #[test]
    fn nested_chain_is_dotted() {
        let chain_inside = traced("parent", (), || {
            traced("child", (), || Ok::<_, String>(chain()))
        })
        .unwrap();
        assert_eq!(chain_inside, "parent.child");
        assert_eq!(depth(), 0);
    }

    #[test]
    fn wrapper_frames_elided_from_chain_but_captured() {
        traced("op", (), || {
            let _wrapper = CallFrame::wrapper();
            assert_eq!(chain(), "op");
            assert_eq!(capture(), vec!["op".to_string(), WRAPPER_FRAME.to_string()]);
            Ok::<_, String>(())
        })
        .unwrap();
    }

    #[test]
    fn deep_recursion_stays_balanced() {
        fn recurse(n: u32) -> Result<(), String> {
            traced("recurse", n, || {
                if n == 0 {
                    fail()
                } else {
                    recurse(n - 1)
                }
            })
        }
        assert!(recurse(32).is_err());
        assert_eq!(depth(), 0);
    }

    #[tokio::test]
    async fn async_chain_matches_sync_chain() {
        let label = traced_async("save_file", "a/b.json", || async {
            traced("encode", (), || Ok::<_, String>(chain()))
        })
        .await
        .unwrap();
        assert_eq!(label, "save_file.encode");
    }

    #[tokio::test]
    async fn concurrent_tasks_have_isolated_stacks() {
        let (a, b) = tokio::join!(
            traced_async("task_a", (), || async {
                tokio::task::yield_now().await;
                Ok::<_, String>(chain())
            }),
            traced_async("task_b", (), || async {
                tokio::task::yield_now().await;
                Ok::<_, String>(chain())
            }),
        );
        assert_eq!(a.unwrap(), "task_a");
        assert_eq!(b.unwrap(), "task_b");
    }
}
