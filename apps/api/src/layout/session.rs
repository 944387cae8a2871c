//! Live layout session: cached measurements plus resize-driven recomputation.
//!
//! The session itself never watches anything. The host owns a `ResizeNotifier`, reports
//! container size changes to it, and wires the session in with `attach_resize`. The
//! returned `ResizeSubscription` disconnects on `unsubscribe()` or drop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::measure::{MeasurementCache, Renderer};
use crate::layout::packer::{
    describe_sections, pack_sections, page_breaks, PageBreak, PageGeometry, PageLayout,
};
use crate::models::resume::ResumeData;

// ────────────────────────────────────────────────────────────────────────────
// Resize notifications
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSize {
    pub width: f32,
    pub height: f32,
}

type ResizeCallback = Arc<dyn Fn(ContainerSize) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: HashMap<u64, ResizeCallback>,
    last_size: Option<ContainerSize>,
}

/// Fan-out point for container size changes, owned by the host.
#[derive(Clone, Default)]
pub struct ResizeNotifier {
    inner: Arc<Mutex<Subscribers>>,
}

impl ResizeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        on_change: impl Fn(ContainerSize) + Send + Sync + 'static,
    ) -> ResizeSubscription {
        let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = subs.next_id;
        subs.next_id += 1;
        subs.callbacks.insert(id, Arc::new(on_change));

        ResizeSubscription {
            id,
            notifier: Arc::downgrade(&self.inner),
            active: true,
        }
    }

    /// Reports the container's current size. Subscribers run only when it changed.
    ///
    /// Callbacks run on a snapshot of the subscriber list, after its lock is released.
    /// A callback unsubscribed mid-notify may still see this one size. The caller must
    /// not hold the lock of a session attached with `attach_resize`.
    pub fn notify(&self, size: ContainerSize) -> usize {
        let callbacks: Vec<ResizeCallback> = {
            let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if subs.last_size == Some(size) {
                return 0;
            }
            subs.last_size = Some(size);
            subs.callbacks.values().cloned().collect()
        };

        for callback in &callbacks {
            callback(size);
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .len()
    }
}

/// Handle to one resize subscription.
pub struct ResizeSubscription {
    id: u64,
    notifier: Weak<Mutex<Subscribers>>,
    active: bool,
}

impl ResizeSubscription {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Disconnects the callback. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(inner) = self.notifier.upgrade() {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .callbacks
                .remove(&self.id);
        }
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

/// One preview's layout state. Pages are rebuilt from scratch on every recompute;
/// only measured heights carry over, and only while content and width are unchanged.
pub struct LayoutSession {
    renderer: Box<dyn Renderer>,
    geometry: PageGeometry,
    cache: MeasurementCache,
    fingerprint: Option<u64>,
    container: Option<ContainerSize>,
    data: Option<ResumeData>,
    pages: Vec<PageLayout>,
}

impl LayoutSession {
    pub fn new(renderer: Box<dyn Renderer>, geometry: PageGeometry) -> Self {
        Self {
            renderer,
            geometry,
            cache: MeasurementCache::default(),
            fingerprint: None,
            container: None,
            data: None,
            pages: Vec::new(),
        }
    }

    /// Lays out `data`, reusing cached heights if the content identity is unchanged.
    pub fn recompute(&mut self, data: &ResumeData) -> &[PageLayout] {
        let fingerprint = data.content_fingerprint();
        if self.fingerprint != Some(fingerprint) {
            self.cache.clear();
            self.fingerprint = Some(fingerprint);
            self.data = Some(data.clone());
        }
        self.relayout();
        &self.pages
    }

    /// Handles a container size change. Returns true when the layout was redone.
    pub fn on_resize(&mut self, size: ContainerSize) -> bool {
        if self.container == Some(size) {
            return false;
        }
        self.container = Some(size);
        self.cache.clear();

        if self.data.is_none() {
            return false;
        }
        debug!(width = size.width, height = size.height, "Container resized, re-measuring");
        self.relayout();
        true
    }

    /// Width of the text column inside the last reported container: the container is
    /// the rendered page, padded on both sides.
    fn content_width(&self) -> Option<f32> {
        self.container
            .map(|size| (size.width - 2.0 * self.geometry.page_padding).max(1.0))
    }

    fn relayout(&mut self) {
        let Some(data) = self.data.as_ref() else {
            self.pages = pack_sections(&[], &self.geometry);
            return;
        };
        let width = self.content_width();
        let cache = &mut self.cache;
        let renderer = &self.renderer;
        let descriptors = describe_sections(data, |id| {
            cache.get_or_measure(id, || match width {
                Some(width) => renderer.measure_at_width(id, data, width),
                None => renderer.measure(id, data),
            })
        });
        self.pages = pack_sections(&descriptors, &self.geometry);
    }

    pub fn pages(&self) -> &[PageLayout] {
        &self.pages
    }

    pub fn page_breaks(&self) -> Vec<PageBreak> {
        page_breaks(&self.pages)
    }

    /// Whether the content spills past page 1, answered from the packed pages.
    pub fn exceeds_single_page(&self) -> bool {
        self.pages.len() > 1
    }

    pub fn cached_measurements(&self) -> usize {
        self.cache.len()
    }
}

/// Subscribes `session` to `notifier`; every size change re-runs its layout.
///
/// The callback locks `session`, so `notify` must not be called while holding it.
pub fn attach_resize(
    session: &Arc<Mutex<LayoutSession>>,
    notifier: &ResizeNotifier,
) -> ResizeSubscription {
    let session = Arc::downgrade(session);
    notifier.subscribe(move |size| {
        if let Some(session) = session.upgrade() {
            session
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on_resize(size);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use std::thread;
    use std::time::Duration;

    use crate::layout::measure::{HeuristicRenderer, TextMetricsRenderer};
    use crate::models::resume::{Education, Experience};
    use crate::models::section::SectionConfig;

    /// Heuristic heights, but counts how often it is asked.
    struct CountingRenderer {
        calls: Arc<AtomicUsize>,
    }

    impl Renderer for CountingRenderer {
        fn measure(&self, section_id: &str, data: &ResumeData) -> f32 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            HeuristicRenderer.measure(section_id, data)
        }
    }

    fn make_data() -> ResumeData {
        ResumeData {
            experience: vec![Experience::default(); 3],
            education: vec![Education::default()],
            sections: vec![
                SectionConfig { id: "summary".to_string(), visible: true, order: 0 },
                SectionConfig { id: "experience".to_string(), visible: true, order: 1 },
                SectionConfig { id: "education".to_string(), visible: true, order: 2 },
            ],
            ..Default::default()
        }
    }

    fn make_session() -> (LayoutSession, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let renderer = CountingRenderer { calls: calls.clone() };
        (LayoutSession::new(Box::new(renderer), PageGeometry::default()), calls)
    }

    fn size(width: f32) -> ContainerSize {
        ContainerSize { width, height: 900.0 }
    }

    #[test]
    fn test_recompute_packs_pages() {
        let (mut session, _) = make_session();
        let pages = session.recompute(&make_data());
        assert_eq!(pages.len(), 2);
        assert!(session.exceeds_single_page());
        assert_eq!(session.page_breaks().len(), 1);
    }

    #[test]
    fn test_unchanged_content_reuses_measurements() {
        let (mut session, calls) = make_session();
        let data = make_data();
        session.recompute(&data);
        session.recompute(&data);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(session.cached_measurements(), 3);
    }

    #[test]
    fn test_changed_content_remeasures() {
        let (mut session, calls) = make_session();
        let mut data = make_data();
        session.recompute(&data);
        data.education.push(Education::default());
        session.recompute(&data);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_resize_remeasures_only_on_change() {
        let (mut session, calls) = make_session();
        session.recompute(&make_data());
        assert!(session.on_resize(size(800.0)));
        assert!(!session.on_resize(size(800.0)));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_resize_before_content_does_nothing() {
        let (mut session, calls) = make_session();
        assert!(!session.on_resize(size(640.0)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(session.pages().is_empty());
    }

    #[test]
    fn test_single_page_content_has_no_breaks() {
        let (mut session, _) = make_session();
        let data = ResumeData {
            sections: vec![SectionConfig { id: "skills".to_string(), visible: true, order: 0 }],
            ..Default::default()
        };
        session.recompute(&data);
        assert!(!session.exceeds_single_page());
        assert!(session.page_breaks().is_empty());
    }

    #[test]
    fn test_notifier_skips_unchanged_size() {
        let notifier = ResizeNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let _sub = notifier.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(notifier.notify(size(500.0)), 1);
        assert_eq!(notifier.notify(size(500.0)), 0);
        assert_eq!(notifier.notify(size(501.0)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_disconnects() {
        let notifier = ResizeNotifier::new();
        let mut sub = notifier.subscribe(|_| {});
        assert_eq!(notifier.subscriber_count(), 1);
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_drop_disconnects() {
        let notifier = ResizeNotifier::new();
        {
            let _sub = notifier.subscribe(|_| {});
            assert_eq!(notifier.subscriber_count(), 1);
        }
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_attach_resize_drives_session() {
        let (mut session, calls) = make_session();
        session.recompute(&make_data());
        let session = Arc::new(Mutex::new(session));
        let notifier = ResizeNotifier::new();

        let mut sub = attach_resize(&session, &notifier);
        notifier.notify(size(700.0));
        assert_eq!(calls.load(Ordering::SeqCst), 6);

        sub.unsubscribe();
        notifier.notify(size(720.0));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    fn section_height(session: &LayoutSession, id: &str) -> f32 {
        session
            .pages()
            .iter()
            .flat_map(|page| &page.sections)
            .find(|section| section.id == id)
            .map(|section| section.estimated_height)
            .unwrap()
    }

    #[test]
    fn test_narrower_container_makes_text_taller() {
        let mut session = LayoutSession::new(
            Box::new(TextMetricsRenderer::default()),
            PageGeometry::default(),
        );
        let data = ResumeData {
            personal_statement: "Shipped storage engines and query planners. ".repeat(60),
            ..Default::default()
        };
        session.recompute(&data);
        let initial = section_height(&session, "personalStatement");

        // an A4-wide container leaves the default 698px column
        assert!(session.on_resize(ContainerSize { width: 794.0, height: 1123.0 }));
        assert_eq!(section_height(&session, "personalStatement"), initial);

        assert!(session.on_resize(ContainerSize { width: 200.0, height: 1123.0 }));
        let narrow = section_height(&session, "personalStatement");
        assert!(narrow > initial, "narrow {narrow} <= wide {initial}");
        assert!(session.exceeds_single_page());
    }

    #[test]
    fn test_notify_while_session_is_locked_elsewhere() {
        let (mut session, calls) = make_session();
        session.recompute(&make_data());
        let session = Arc::new(Mutex::new(session));
        let notifier = ResizeNotifier::new();
        let _sub = attach_resize(&session, &notifier);

        let guard = session.lock().unwrap();
        let notifying = {
            let notifier = notifier.clone();
            thread::spawn(move || notifier.notify(size(640.0)))
        };
        // give the notifier thread time to block on the session
        thread::sleep(Duration::from_millis(50));
        assert_eq!(notifier.subscriber_count(), 1);
        drop(guard);

        assert_eq!(notifying.join().unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }
}
