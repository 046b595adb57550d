// ============================================================================
// ripple-signals - Operators
// map and filter over signals
// ============================================================================
//
// Each operator subscribes upstream once per downstream observer. Disposing
// the downstream handle disposes the upstream subscription. Completion
// always passes through untouched.
// ============================================================================

use std::sync::Arc;

use crate::core::types::Event;
use crate::primitives::signal::Signal;

impl<T: Send + 'static> Signal<T> {
    /// Transform every value with `transform`.
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_signals::{AsSignal, Observable};
    ///
    /// let text = Observable::new(String::from("abcd"));
    /// let valid = Observable::new(false);
    /// let _h = text.map(|t| t.chars().count() > 3).bind_to(&valid);
    ///
    /// assert!(valid.get());
    /// ```
    pub fn map<U, F>(&self, transform: F) -> Signal<U>
    where
        U: Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let transform = Arc::new(transform);
        Signal::new(move |observer| {
            let transform = transform.clone();
            upstream.observe(move |event| match event {
                Event::Next(value) => observer(&Event::Next(transform(value))),
                Event::Completed => observer(&Event::Completed),
            })
        })
    }

    /// Forward only the values for which `predicate` holds.
    pub fn filter<F>(&self, predicate: F) -> Signal<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let predicate = Arc::new(predicate);
        Signal::new(move |observer| {
            let predicate = predicate.clone();
            upstream.observe(move |event| match event {
                Event::Next(value) if !predicate(value) => {}
                _ => observer(event),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::core::types::{AnyDisposable, Disposable, Event};
    use crate::primitives::signal::{AsSignal, Signal};
    use crate::primitives::subject::Subject;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn collect<T: Clone + Send + 'static>(
        signal: &Signal<T>,
    ) -> (Arc<Mutex<Vec<Event<T>>>>, AnyDisposable) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let handle = signal.observe(move |event| log_clone.lock().push(event.clone()));
        (log, handle)
    }

    #[test]
    fn map_transforms_values_and_forwards_completion() {
        let subject: Subject<String> = Subject::new();
        let (log, _h) = collect(&subject.map(|s| s.len()));

        subject.next("ab".into());
        subject.next("abcd".into());
        subject.completed();

        assert_eq!(
            *log.lock(),
            vec![Event::Next(2), Event::Next(4), Event::Completed]
        );
    }

    #[test]
    fn filter_drops_failing_values() {
        let subject: Subject<i32> = Subject::new();
        let (log, _h) = collect(&subject.filter(|v| v % 2 == 0));

        for v in 1..=5 {
            subject.next(v);
        }
        subject.completed();

        assert_eq!(
            *log.lock(),
            vec![Event::Next(2), Event::Next(4), Event::Completed]
        );
    }

    #[test]
    fn disposing_downstream_detaches_upstream() {
        let subject: Subject<i32> = Subject::new();
        let (log, handle) = collect(&subject.map(|v| v * 10).filter(|v| *v > 10));
        assert_eq!(subject.observer_count(), 1);

        subject.next(2);
        handle.dispose();
        subject.next(3);

        assert_eq!(*log.lock(), vec![Event::Next(20)]);
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn each_observer_gets_its_own_upstream_subscription() {
        let subject: Subject<i32> = Subject::new();
        let mapped = subject.map(|v| v + 1);
        let (a, _ha) = collect(&mapped);
        let (b, _hb) = collect(&mapped);

        subject.next(1);

        assert_eq!(subject.observer_count(), 2);
        assert_eq!(*a.lock(), vec![Event::Next(2)]);
        assert_eq!(*b.lock(), vec![Event::Next(2)]);
    }
}
