//! Query sessions: one walk through the questionnaire.
//!
//! A session starts by asking the root answer which question to pose first,
//! then alternates between receiving an answer for the current question and
//! selecting the next one. It ends when the selector has nothing left to ask.
//!
//! State machine:
//!
//! ```text
//!   Active --answer--> Active
//!   Active --answer, no next question--> Terminal
//!   Active --invariant violated--> Aborted
//! ```

use crate::error::{QuerentError, Result};
use querent_core::graph::QueryGraph;
use querent_core::node::{AnswerNode, QueryNode};
use querent_core::select::{NextQuestion, RelevanceSelector};
use querent_core::types::{QaKey, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// A question is waiting for an answer.
    Active,
    /// No further question is available.
    Terminal,
    /// An invariant was violated; the session accepts no more answers.
    Aborted,
}

/// Immutable snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub id: SessionId,
    pub conclusion: Option<String>,
    pub asked_questions: Vec<String>,
    /// `received_answers[i]` answers `asked_questions[i]`.
    pub received_answers: Vec<String>,
}

impl SessionResult {
    pub fn new<Q, A>(conclusion: Option<&str>, questions: Q, answers: A) -> Self
    where
        Q: IntoIterator,
        Q::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            id: SessionId::new(),
            conclusion: conclusion.map(str::to_string),
            asked_questions: questions.into_iter().map(Into::into).collect(),
            received_answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn conclusion(&self) -> Option<&str> {
        self.conclusion.as_deref()
    }

    pub fn questions(&self) -> &[String] {
        &self.asked_questions
    }

    pub fn answers(&self) -> &[String] {
        &self.received_answers
    }

    /// Question/answer pairs in the order they were asked.
    pub fn pairs(&self) -> impl Iterator<Item = QaKey> + '_ {
        self.asked_questions
            .iter()
            .zip(&self.received_answers)
            .map(|(q, a)| QaKey::new(q.clone(), a.clone()))
    }

    pub fn len(&self) -> usize {
        self.asked_questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asked_questions.is_empty()
    }
}

/// Mutable traversal state for one respondent.
pub struct QuerySession<'g> {
    id: SessionId,
    graph: &'g QueryGraph,
    selector: Box<dyn NextQuestion + 'g>,
    conclusion: Option<String>,
    asked_questions: Vec<String>,
    received_answers: Vec<String>,
    current_query: Option<String>,
    state: SessionState,
}

impl<'g> QuerySession<'g> {
    /// Start a session using [`RelevanceSelector`].
    ///
    /// The graph's root is rebuilt toward `conclusion` first.
    pub fn new(graph: &'g mut QueryGraph, conclusion: Option<&str>) -> Result<Self> {
        Self::with_selector(graph, conclusion, RelevanceSelector)
    }

    pub fn with_selector<S>(graph: &'g mut QueryGraph, conclusion: Option<&str>, selector: S) -> Result<Self>
    where
        S: NextQuestion + 'g,
    {
        graph.build(conclusion);
        let graph: &'g QueryGraph = graph;
        Self::on_built_graph(graph, Box::new(selector))
    }

    /// Start a session on a graph whose root has already been built.
    ///
    /// The session is labeled with the conclusion the root is weighted for.
    pub fn on_built_graph(graph: &'g QueryGraph, mut selector: Box<dyn NextQuestion + 'g>) -> Result<Self> {
        let conclusion = graph.conclusion();
        let id = SessionId::new();
        let first = graph
            .root_answer()
            .pick_next_question(graph, &[], selector.as_mut());

        let (current_query, state) = match first {
            Some(question) => {
                graph.require(&question)?;
                (Some(question), SessionState::Active)
            }
            None => (None, SessionState::Terminal),
        };
        debug!(session = %id, first = ?current_query, "session started");

        Ok(Self {
            id,
            graph,
            selector,
            conclusion: conclusion.map(str::to_string),
            asked_questions: Vec::new(),
            received_answers: Vec::new(),
            current_query,
            state,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state == SessionState::Terminal
    }

    pub fn conclusion(&self) -> Option<&str> {
        self.conclusion.as_deref()
    }

    /// The question waiting for an answer, if any.
    pub fn current_query(&self) -> Option<&'g QueryNode> {
        let graph = self.graph;
        self.current_query.as_deref().and_then(|q| graph.node(q))
    }

    pub fn asked_questions(&self) -> &[String] {
        &self.asked_questions
    }

    pub fn received_answers(&self) -> &[String] {
        &self.received_answers
    }

    /// Resolved `(question, answer)` nodes in asking order.
    pub fn answered(&self) -> impl Iterator<Item = (&'g QueryNode, &'g AnswerNode)> + '_ {
        let graph = self.graph;
        self.asked_questions
            .iter()
            .zip(&self.received_answers)
            .filter_map(move |(q, a)| {
                let node = graph.node(q)?;
                Some((node, node.answer(a)?))
            })
    }

    /// Record `answer` for the current question and move to the next one.
    ///
    /// Returns the next question, or `None` once the session is terminal.
    /// An unknown answer label leaves the session unchanged. A repeated or
    /// stalled question aborts the session.
    pub fn receive_answer_for_next_question(&mut self, answer: &str) -> Result<Option<&'g QueryNode>> {
        match self.state {
            SessionState::Active => {}
            SessionState::Terminal => return Err(QuerentError::SessionFinished(self.id)),
            SessionState::Aborted => return Err(QuerentError::SessionAborted(self.id)),
        }
        let Some(current) = self.current_query.clone() else {
            return Err(QuerentError::SessionFinished(self.id));
        };

        let graph = self.graph;
        let node = graph.require(&current)?;
        let answer_node = node.answer(answer).ok_or_else(|| QuerentError::UnknownAnswer {
            question: current.clone(),
            answer: answer.to_string(),
        })?;

        if self.asked_questions.contains(&current) {
            return Err(self.abort(QuerentError::RepeatedQuestion(current)));
        }

        self.asked_questions.push(current.clone());
        self.received_answers.push(answer_node.label().to_string());
        debug!(session = %self.id, question = %current, answer, "answer received");

        let next = answer_node.pick_next_question(graph, &self.asked_questions, self.selector.as_mut());
        let Some(next) = next else {
            self.current_query = None;
            self.state = SessionState::Terminal;
            info!(
                session = %self.id,
                conclusion = ?self.conclusion,
                asked = self.asked_questions.len(),
                "session complete"
            );
            return Ok(None);
        };

        if next == current || self.asked_questions.contains(&next) {
            return Err(self.abort(QuerentError::StalledTraversal { question: current, next }));
        }
        let next_node = match graph.require(&next) {
            Ok(node) => node,
            Err(e) => return Err(self.abort(e.into())),
        };

        self.current_query = Some(next);
        Ok(Some(next_node))
    }

    /// Snapshot of what has been asked so far.
    ///
    /// Valid in any state; for an active session the result is partial.
    pub fn get_session_result(&self) -> SessionResult {
        SessionResult {
            id: self.id,
            conclusion: self.conclusion.clone(),
            asked_questions: self.asked_questions.clone(),
            received_answers: self.received_answers.clone(),
        }
    }

    /// The complete result; fails unless the session is terminal.
    pub fn finish(&self) -> Result<SessionResult> {
        match self.state {
            SessionState::Terminal => Ok(self.get_session_result()),
            SessionState::Active => Err(QuerentError::SessionNotTerminal(self.id)),
            SessionState::Aborted => Err(QuerentError::SessionAborted(self.id)),
        }
    }

    fn abort(&mut self, error: QuerentError) -> QuerentError {
        warn!(session = %self.id, %error, "aborting session");
        self.state = SessionState::Aborted;
        self.current_query = None;
        error
    }
}

impl std::fmt::Debug for QuerySession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySession")
            .field("id", &self.id)
            .field("conclusion", &self.conclusion)
            .field("asked_questions", &self.asked_questions)
            .field("received_answers", &self.received_answers)
            .field("current_query", &self.current_query)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querent_core::select::SequentialSelector;
    use proptest::prelude::*;

    fn graph() -> QueryGraph {
        QueryGraph::new(vec![
            QueryNode::new("Q1").with_answers(["a", "b"]).with_relevance("flu", 3.0),
            QueryNode::new("Q2").with_answers(["c", "d"]).with_relevance("flu", 2.0),
            QueryNode::new("Q3").with_answers(["e", "f"]).with_relevance("flu", 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn walks_every_question_then_terminates() {
        let mut graph = graph();
        let mut session = QuerySession::new(&mut graph, Some("flu")).unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.current_query().unwrap().question(), "Q1");

        let next = session.receive_answer_for_next_question("a").unwrap();
        assert_eq!(next.unwrap().question(), "Q2");
        let next = session.receive_answer_for_next_question("c").unwrap();
        assert_eq!(next.unwrap().question(), "Q3");
        let next = session.receive_answer_for_next_question("e").unwrap();
        assert!(next.is_none());

        assert!(session.is_terminal());
        assert!(session.current_query().is_none());
        assert_eq!(session.asked_questions(), ["Q1", "Q2", "Q3"]);
        assert_eq!(session.received_answers(), ["a", "c", "e"]);

        let result = session.finish().unwrap();
        assert_eq!(result.conclusion(), Some("flu"));
        assert_eq!(result.id, session.id());
        assert_eq!(
            result.pairs().collect::<Vec<_>>(),
            vec![QaKey::new("Q1", "a"), QaKey::new("Q2", "c"), QaKey::new("Q3", "e")]
        );
    }

    #[test]
    fn unknown_answer_is_recoverable() {
        let mut graph = graph();
        let mut session = QuerySession::new(&mut graph, None).unwrap();
        let err = session.receive_answer_for_next_question("zzz").unwrap_err();
        assert_eq!(
            err,
            QuerentError::UnknownAnswer {
                question: "Q1".into(),
                answer: "zzz".into()
            }
        );
        assert!(!err.is_fatal());
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.asked_questions().is_empty());

        assert!(session.receive_answer_for_next_question("b").is_ok());
        assert_eq!(session.asked_questions(), ["Q1"]);
    }

    #[test]
    fn answering_a_terminal_session_fails() {
        let mut graph = graph();
        let mut session = QuerySession::with_selector(&mut graph, None, SequentialSelector).unwrap();
        for answer in ["a", "c", "e"] {
            session.receive_answer_for_next_question(answer).unwrap();
        }
        let err = session.receive_answer_for_next_question("a").unwrap_err();
        assert_eq!(err, QuerentError::SessionFinished(session.id()));
    }

    #[test]
    fn partial_results_are_allowed_but_finish_is_strict() {
        let mut graph = graph();
        let mut session = QuerySession::new(&mut graph, Some("flu")).unwrap();
        session.receive_answer_for_next_question("a").unwrap();

        let partial = session.get_session_result();
        assert_eq!(partial.questions(), ["Q1"]);
        assert_eq!(partial.answers(), ["a"]);
        assert_eq!(
            session.finish().unwrap_err(),
            QuerentError::SessionNotTerminal(session.id())
        );
    }

    #[test]
    fn empty_graph_starts_terminal() {
        let mut graph = QueryGraph::new(Vec::new()).unwrap();
        let session = QuerySession::new(&mut graph, None).unwrap();
        assert!(session.is_terminal());
        assert!(session.finish().unwrap().is_empty());
    }

    #[test]
    fn repeated_current_question_aborts_and_keeps_history() {
        let mut graph = graph();
        let mut session = QuerySession::new(&mut graph, Some("flu")).unwrap();
        session.asked_questions.push("Q1".to_string());
        session.received_answers.push("b".to_string());

        let err = session.receive_answer_for_next_question("a").unwrap_err();
        assert_eq!(err, QuerentError::RepeatedQuestion("Q1".into()));
        assert!(err.is_fatal());
        assert_eq!(session.state(), SessionState::Aborted);
        assert!(session.current_query().is_none());
        assert_eq!(session.asked_questions(), ["Q1"]);
        assert_eq!(session.received_answers(), ["b"]);
        assert_eq!(
            session.finish().unwrap_err(),
            QuerentError::SessionAborted(session.id())
        );
    }

    #[test]
    fn prebuilt_graph_labels_session_with_its_conclusion() {
        let mut graph = graph();
        graph.build(Some("cold"));
        let session = QuerySession::on_built_graph(&graph, Box::new(RelevanceSelector)).unwrap();
        assert_eq!(session.conclusion(), Some("cold"));
        assert_eq!(session.get_session_result().conclusion(), Some("cold"));
        drop(session);

        graph.build(None);
        let session = QuerySession::on_built_graph(&graph, Box::new(RelevanceSelector)).unwrap();
        assert_eq!(session.conclusion(), None);
    }

    #[test]
    fn selector_repeating_the_last_question_aborts() {
        let mut graph = graph();
        let stuck = |_: &QueryGraph, answer: &AnswerNode, _: &[String]| {
            Some(if answer.is_root() { "Q1".to_string() } else { answer.question().to_string() })
        };
        let mut session = QuerySession::with_selector(&mut graph, None, stuck).unwrap();

        let err = session.receive_answer_for_next_question("a").unwrap_err();
        assert_eq!(
            err,
            QuerentError::StalledTraversal {
                question: "Q1".into(),
                next: "Q1".into()
            }
        );
        assert!(err.is_fatal());
        assert_eq!(session.state(), SessionState::Aborted);
        assert_eq!(
            session.receive_answer_for_next_question("a").unwrap_err(),
            QuerentError::SessionAborted(session.id())
        );
        assert!(session.finish().is_err());
    }

    #[test]
    fn selector_returning_an_asked_question_aborts() {
        let mut graph = graph();
        let mut calls = 0;
        let replay = move |_: &QueryGraph, _: &AnswerNode, _: &[String]| {
            calls += 1;
            Some(if calls == 2 { "Q2" } else { "Q1" }.to_string())
        };
        let mut session = QuerySession::with_selector(&mut graph, None, replay).unwrap();
        session.receive_answer_for_next_question("a").unwrap();

        let err = session.receive_answer_for_next_question("c").unwrap_err();
        assert!(matches!(err, QuerentError::StalledTraversal { ref next, .. } if next == "Q1"));
        assert_eq!(session.asked_questions(), ["Q1", "Q2"]);
        assert_eq!(session.received_answers(), ["a", "c"]);
    }

    #[test]
    fn selector_naming_a_missing_question_fails() {
        let mut graph = graph();
        let ghost = |_: &QueryGraph, _: &AnswerNode, _: &[String]| Some("Q9".to_string());
        let err = QuerySession::with_selector(&mut graph, None, ghost).unwrap_err();
        assert!(matches!(err, QuerentError::Graph(_)));
    }

    #[test]
    fn answered_resolves_nodes() {
        let mut graph = graph();
        let mut session = QuerySession::new(&mut graph, Some("flu")).unwrap();
        session.receive_answer_for_next_question("b").unwrap();
        session.receive_answer_for_next_question("d").unwrap();

        let pairs: Vec<_> = session
            .answered()
            .map(|(q, a)| (q.question(), a.label()))
            .collect();
        assert_eq!(pairs, vec![("Q1", "b"), ("Q2", "d")]);
    }

    proptest! {
        #[test]
        fn asked_questions_never_repeat(choices in proptest::collection::vec(any::<bool>(), 3)) {
            let mut graph = graph();
            let mut session = QuerySession::new(&mut graph, Some("flu")).unwrap();
            let mut step = 0;
            while let Some(node) = session.current_query() {
                let labels: Vec<&str> = node.answers().map(|a| a.label()).collect();
                let pick = if choices[step % choices.len()] { labels[0] } else { labels[labels.len() - 1] };
                session.receive_answer_for_next_question(pick).unwrap();
                step += 1;

                let asked = session.asked_questions();
                prop_assert_eq!(asked.len(), session.received_answers().len());
                let mut unique = asked.to_vec();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), asked.len());
                if let Some(next) = session.current_query() {
                    prop_assert!(!asked.iter().any(|q| q == next.question()));
                }
            }
            prop_assert!(session.is_terminal());
            prop_assert_eq!(session.asked_questions().len(), 3);
        }
    }
}
