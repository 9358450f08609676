use super::{Comment, PendingComment, Session, SessionSnapshot};
use crate::sentiment::{Label, SentimentClassifier};
use parking_lot::Mutex;
use std::sync::Arc;

/// `ingest` 1 回分の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// このラベルで追加・集計した
    Added(Label),
    /// 同じ本文がセッションに既にある
    Duplicate,
    /// 取り込み先のライブセッションがない
    Inactive,
}

/// ライブセッションの唯一の所有者
///
/// 全操作がセッションのロックを取るため、`ingest` の重複判定と追加は並行呼び出しに対して
/// アトミックになる。
#[derive(Debug)]
pub struct SessionStore {
    classifier: Arc<SentimentClassifier>,
    session: Mutex<Session>,
}

impl SessionStore {
    pub fn new(classifier: Arc<SentimentClassifier>) -> Self {
        Self {
            classifier,
            session: Mutex::new(Session::idle()),
        }
    }

    pub fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }

    /// 既存のセッションを新しいライブセッションで置き換える
    pub fn start_session(&self, video_id: &str, live_chat_id: &str) {
        let mut session = self.session.lock();
        if session.is_live() {
            tracing::info!(
                previous_video_id = ?session.video_id(),
                video_id,
                "🔄 Replacing live session"
            );
        }
        *session = Session::live(video_id, live_chat_id);
        tracing::info!(video_id, live_chat_id, "▶️ Session started");
    }

    pub fn ingest(&self, pending: PendingComment) -> IngestOutcome {
        let mut session = self.session.lock();
        self.ingest_locked(&mut session, pending)
    }

    fn ingest_locked(&self, session: &mut Session, pending: PendingComment) -> IngestOutcome {
        if !session.is_live() {
            return IngestOutcome::Inactive;
        }
        if session.contains_text(&pending.text) {
            tracing::trace!(author = %pending.author, "Duplicate comment skipped");
            return IngestOutcome::Duplicate;
        }

        let sentiment = match pending.sentiment {
            Some(label) => label,
            None => self.classifier.classify(&pending.text),
        };

        session.push(Comment {
            author: pending.author,
            text: pending.text,
            sentiment,
            timestamp: pending.timestamp,
        });

        IngestOutcome::Added(sentiment)
    }

    /// 順番に取り込み、追加した件数を返す
    pub fn ingest_batch<I, T>(&self, batch: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: Into<PendingComment>,
    {
        let mut session = self.session.lock();
        self.ingest_all(&mut session, batch)
    }

    /// `live_chat_id` から取得したバッチ用の `ingest_batch`
    ///
    /// 取得中にセッションが別のチャットへ切り替わっていた場合、バッチ全体を破棄して 0 を返す。
    pub fn ingest_batch_for<I, T>(&self, live_chat_id: &str, batch: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: Into<PendingComment>,
    {
        let mut session = self.session.lock();
        if !session.is_live() || session.live_chat_id() != Some(live_chat_id) {
            tracing::debug!(
                live_chat_id,
                current = ?session.live_chat_id(),
                "🗑️ Stale batch discarded"
            );
            return 0;
        }
        self.ingest_all(&mut session, batch)
    }

    fn ingest_all<I, T>(&self, session: &mut Session, batch: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: Into<PendingComment>,
    {
        let added = batch
            .into_iter()
            .map(|item| self.ingest_locked(session, item.into()))
            .filter(|outcome| matches!(outcome, IngestOutcome::Added(_)))
            .count();

        if added > 0 {
            let stats = session.stats();
            tracing::debug!(
                added,
                total = stats.total,
                positive = stats.positive,
                neutral = stats.neutral,
                negative = stats.negative,
                "📊 Session stats updated"
            );
        }
        added
    }

    /// セッションとコメントを破棄し、空の非ライブセッションに戻す
    pub fn reset(&self) {
        *self.session.lock() = Session::idle();
        tracing::info!("🧹 Session reset");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    pub fn is_live(&self) -> bool {
        self.session.lock().is_live()
    }

    pub fn live_chat_id(&self) -> Option<String> {
        self.session.lock().live_chat_id().map(str::to_string)
    }

    pub fn video_id(&self) -> Option<String> {
        self.session.lock().video_id().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStats;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(SentimentClassifier::new().unwrap()))
    }

    fn pending(author: &str, text: &str) -> PendingComment {
        PendingComment::new(author, text, "2024-01-01T00:00:00Z")
    }

    #[test]
    fn test_ingest_requires_live_session() {
        let store = store();
        assert_eq!(store.ingest(pending("a", "hello")), IngestOutcome::Inactive);
        assert_eq!(store.snapshot().stats.total, 0);
    }

    #[test]
    fn test_ingest_classifies_unlabeled() {
        let store = store();
        store.start_session("video", "chat");
        assert_eq!(
            store.ingest(pending("a", "this is terrible 😢")),
            IngestOutcome::Added(Label::Negative)
        );
        let snapshot = store.snapshot();
        assert_eq!(snapshot.comments[0].sentiment, Label::Negative);
        assert_eq!(snapshot.stats.negative, 1);
    }

    #[test]
    fn test_ingest_keeps_existing_label() {
        let store = store();
        store.start_session("video", "chat");
        let outcome = store.ingest(pending("a", "this is terrible 😢").labeled(Label::Positive));
        assert_eq!(outcome, IngestOutcome::Added(Label::Positive));
        assert_eq!(store.snapshot().stats.positive, 1);
    }

    #[test]
    fn test_duplicate_text_counted_once() {
        let store = store();
        store.start_session("video", "chat");
        store.ingest(pending("alice", "first!"));
        let outcome = store.ingest(PendingComment::new("bob", "first!", "2024-01-01T00:00:09Z"));
        assert_eq!(outcome, IngestOutcome::Duplicate);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.stats.total, 1);
        assert_eq!(snapshot.comments.len(), 1);
        assert_eq!(snapshot.comments[0].author, "alice");
    }

    #[test]
    fn test_batch_dedups_within_batch() {
        let store = store();
        store.start_session("video", "chat");
        let added = store.ingest_batch(vec![
            pending("a", "gg"),
            pending("b", "gg"),
            pending("c", "gg wp"),
        ]);
        assert_eq!(added, 2);
        assert_eq!(store.snapshot().stats.total, 2);
    }

    #[test]
    fn test_stats_invariant_holds_after_every_ingest() {
        let store = store();
        store.start_session("video", "chat");
        for text in ["I LOVE this!! 😍😍😍", "ok", "worst stream ever", "ok", "lol", "??"] {
            store.ingest(pending("x", text));
            assert!(store.snapshot().stats.is_consistent());
        }
        assert_eq!(store.snapshot().stats.total, 5);
    }

    #[test]
    fn test_start_session_replaces_previous() {
        let store = store();
        store.start_session("one", "chat-1");
        store.ingest(pending("a", "hello"));
        store.start_session("two", "chat-2");

        assert_eq!(store.video_id().as_deref(), Some("two"));
        assert_eq!(store.live_chat_id().as_deref(), Some("chat-2"));
        assert!(store.snapshot().comments.is_empty());
        // 前のセッションの本文は既出扱いにならない
        assert!(matches!(store.ingest(pending("a", "hello")), IngestOutcome::Added(_)));
    }

    #[test]
    fn test_batch_for_previous_chat_is_discarded() {
        let store = store();
        store.start_session("one", "chat-1");
        store.start_session("two", "chat-2");

        assert_eq!(store.ingest_batch_for("chat-1", vec![pending("a", "from stream one")]), 0);
        assert!(store.snapshot().comments.is_empty());

        assert_eq!(store.ingest_batch_for("chat-2", vec![pending("a", "from stream two")]), 1);
        assert_eq!(store.snapshot().comments[0].text, "from stream two");
    }

    #[test]
    fn test_batch_for_after_reset_is_discarded() {
        let store = store();
        store.start_session("one", "chat-1");
        store.reset();
        assert_eq!(store.ingest_batch_for("chat-1", vec![pending("a", "late")]), 0);
        assert_eq!(store.snapshot().stats.total, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let store = store();
        store.start_session("video", "chat");
        store.ingest_batch(vec![pending("a", "nice"), pending("b", "bad")]);
        store.reset();

        let snapshot = store.snapshot();
        assert!(snapshot.comments.is_empty());
        assert_eq!(snapshot.stats, SessionStats::default());
        assert!(!store.is_live());
        assert!(store.live_chat_id().is_none());
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let store = store();
        store.start_session("video", "chat");
        store.ingest(pending("a", "hello"));
        let mut snapshot = store.snapshot();
        snapshot.comments.clear();
        assert_eq!(store.snapshot().comments.len(), 1);
    }
}
