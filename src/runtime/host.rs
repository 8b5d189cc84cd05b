//! Entry point called by instrumented render functions

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::arguments::Arguments;
use super::settings::TrackingSettings;
use super::sink::{LogSink, LOGGER_TAG};
use super::tracker::{Recomposition, TrackerInstance};

/// Services a rendering runtime offers to the tracker
///
/// `remember` returns the storage cell of the current call site, creating it
/// with `init` on first use; dropping the cell when the call site leaves the
/// composition must drop its value. `side_effect` runs once the current render
/// has been committed.
pub trait CompositionHost {
    fn settings(&self) -> TrackingSettings;

    fn sink(&self) -> Arc<dyn LogSink>;

    fn remember<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>>;

    fn side_effect(&mut self, effect: Box<dyn FnOnce()>);
}

/// Track one re-execution of the render function `name`
pub fn recomposition_tracker<H: CompositionHost>(
    host: &mut H,
    name: &'static str,
    arguments: &Arguments,
    skipped: &[&str],
) -> Recomposition {
    if !host.settings().enabled {
        return Recomposition::Disabled;
    }

    let sink = host.sink();
    let instance_sink = Arc::clone(&sink);
    let cell = host.remember(move || TrackerInstance::new(name, instance_sink));

    let outcome = match cell.try_borrow_mut() {
        Ok(mut instance) => instance.recompose(arguments, skipped),
        Err(_) => {
            sink.error(
                LOGGER_TAG,
                &format!("{} re-entered its tracker while it was running", name),
            );
            return Recomposition::Reentered;
        }
    };

    if outcome == Recomposition::Initial {
        let pending = Rc::clone(&cell);
        host.side_effect(Box::new(move || match pending.try_borrow_mut() {
            Ok(mut instance) => instance.commit(),
            Err(_) => sink.error(
                LOGGER_TAG,
                &format!("{} was running when its first render was committed", name),
            ),
        }));
    }
    outcome
}
