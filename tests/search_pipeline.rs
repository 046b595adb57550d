use parking_lot::Mutex;
use ripple_signals::{
    DisposeBagProvider, DisposeIn, MainQueue, MirrorTarget, Observable, Query, RenderOp,
    SearchCallback, SearchConfig, SearchFailure, SearchItem, SearchResult, SearchService,
    SearchViewModel, USER_FAILURE_MESSAGE,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Records queries and lets the test answer them later.
#[derive(Default)]
struct ScriptedService {
    pending: Mutex<Vec<(Query, SearchCallback)>>,
}

impl ScriptedService {
    fn queries(&self) -> Vec<String> {
        self.pending.lock().iter().map(|(q, _)| q.text.clone()).collect()
    }

    fn answer_next(&self, result: SearchResult) {
        let (_, callback) = self.pending.lock().remove(0);
        callback(result);
    }
}

impl SearchService for ScriptedService {
    fn search(&self, query: Query, callback: SearchCallback) {
        self.pending.lock().push((query, callback));
    }
}

struct Screen {
    view_model: SearchViewModel,
    service: Arc<ScriptedService>,
    queue: MainQueue,
    field: Observable<String>,
    table: Arc<Mutex<MirrorTarget<SearchItem>>>,
    messages: Arc<Mutex<Vec<String>>>,
}

fn screen() -> Screen {
    let queue = MainQueue::new(tokio::runtime::Handle::current());
    let service = Arc::new(ScriptedService::default());
    let view_model = SearchViewModel::new(
        &SearchConfig::with_api_key("test-key"),
        service.clone(),
        Arc::new(queue.clone()),
    );

    let field = Observable::new(String::new());
    let bag = view_model.dispose_bag();
    view_model.search_text().bidirectional_bind(&field).dispose_in(bag);

    let table = Arc::new(Mutex::new(MirrorTarget::<SearchItem>::new()));
    view_model.results().bind_to_target(&table).dispose_in(bag);

    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();
    view_model
        .errors()
        .observe_next(move |m| sink.lock().push(m.clone()))
        .dispose_in(bag);

    Screen {
        view_model,
        service,
        queue,
        field,
        table,
        messages,
    }
}

async fn type_text(field: &Observable<String>, text: &str) {
    for end in 1..=text.len() {
        field.set(text[..end].to_string());
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_settled_typing_issues_one_search() {
    let s = screen();

    type_text(&s.field, "abcde").await;
    assert!(s.view_model.is_valid_query().get());
    assert!(s.service.queries().is_empty());

    sleep(Duration::from_millis(600)).await;
    assert_eq!(s.queue.run_pending(), 1);

    assert_eq!(s.service.queries(), vec!["abcde".to_string()]);
    assert!(s.view_model.in_flight().get());
}

#[tokio::test(start_paused = true)]
async fn test_search_waits_out_the_full_window() {
    let s = screen();

    s.field.set("abcde".to_string());
    sleep(Duration::from_millis(499)).await;
    assert_eq!(s.queue.run_pending(), 0);
    assert!(s.service.queries().is_empty());
    assert!(!s.view_model.in_flight().get());

    sleep(Duration::from_millis(2)).await;
    assert_eq!(s.queue.run_pending(), 1);
    assert_eq!(s.service.queries(), vec!["abcde".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_short_text_never_searches() {
    let s = screen();

    type_text(&s.field, "abcd").await;
    sleep(Duration::from_millis(600)).await;
    s.queue.run_pending();

    assert!(s.service.queries().is_empty());
    assert!(s.view_model.is_valid_query().get());
    assert!(!s.view_model.in_flight().get());
}

#[tokio::test(start_paused = true)]
async fn test_success_renders_results_in_one_transaction() {
    let s = screen();
    s.view_model.results().append(SearchItem::new("stale", "u0"));

    type_text(&s.field, "abcde").await;
    sleep(Duration::from_millis(600)).await;
    s.queue.run_pending();
    s.table.lock().clear_ops();

    s.service.answer_next(Ok(vec![
        SearchItem::new("a", "https://img/a"),
        SearchItem::new("b", "https://img/b"),
    ]));

    assert!(!s.view_model.in_flight().get());
    let table = s.table.lock();
    let names: Vec<_> = table.rows().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(
        table.ops(),
        &[
            RenderOp::BeginUpdates,
            RenderOp::Delete(vec![0]),
            RenderOp::Insert(vec![0, 1]),
            RenderOp::EndUpdates,
        ]
    );
    assert!(s.messages.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_results_and_reports_once() {
    let s = screen();
    s.view_model.results().append(SearchItem::new("kept", "u0"));

    type_text(&s.field, "abcdef").await;
    sleep(Duration::from_millis(600)).await;
    s.queue.run_pending();

    s.service
        .answer_next(Err(SearchFailure::Decode("unexpected payload".into())));

    assert!(!s.view_model.in_flight().get());
    assert_eq!(*s.messages.lock(), vec![USER_FAILURE_MESSAGE.to_string()]);
    assert_eq!(s.table.lock().rows().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_view_model_writes_back_to_field() {
    let s = screen();

    s.view_model.search_text().set("from-model".to_string());
    assert_eq!(s.field.get(), "from-model");

    s.field.set("from-field".to_string());
    assert_eq!(s.view_model.search_text().get(), "from-field");
}

#[tokio::test(start_paused = true)]
async fn test_teardown_stops_pending_search() {
    let s = screen();

    type_text(&s.field, "abcde").await;
    s.view_model.teardown();
    sleep(Duration::from_millis(600)).await;
    s.queue.run_pending();

    assert!(s.service.queries().is_empty());
    s.field.set("ignored".to_string());
    assert_ne!(s.view_model.search_text().get(), "ignored");
}
