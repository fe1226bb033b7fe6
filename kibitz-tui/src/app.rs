//! Terminal app: event loop, key handling and layout.

use analysis::annotate::{annotate, AnnotateContext, AnnotateOutcome};
use analysis::summary::{summarize, SummaryInputs, SummaryTable};
use analysis::worst_moves::key_moves;
use baduk::{Board, MoveTree, NodeId};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;
use review_client::{RequestedKind, StreamEvent};
use tokio_stream::StreamExt;

use crate::controller::{Followup, ReviewController};
use crate::preferences::{save_preferences, Preferences};
use crate::ui::board::GobanPanel;
use crate::ui::chart::ReviewChart;
use crate::ui::panel::ReviewInfoPanel;
use crate::ui::table::SummaryTablePanel;

pub struct App {
    pub controller: ReviewController,
    pub prefs: Preferences,
    pub tree: MoveTree,
    pub cur: NodeId,
    /// Feedback from the last user action, e.g. a refused request.
    status: Option<String>,
    quit: bool,
}

enum Tick {
    Input(Event),
    Stream(Option<StreamEvent>),
    Flush,
}

impl App {
    pub fn new(controller: ReviewController, prefs: Preferences, tree: MoveTree) -> Self {
        let cur = tree.root();
        Self {
            controller,
            prefs,
            tree,
            cur,
            status: None,
            quit: false,
        }
    }

    pub async fn run<B: ratatui::backend::Backend>(
        mut self,
        terminal: &mut ratatui::Terminal<B>,
    ) -> anyhow::Result<()> {
        self.controller.refresh().await?;
        self.maybe_request_variation().await;
        let mut input = crossterm::event::EventStream::new();

        while !self.quit {
            terminal.draw(|frame| self.draw(frame))?;

            let deadline = self.controller.flush_deadline();
            let subscribed = self.controller.subscribed();
            let tick = tokio::select! {
                maybe_event = input.next() => match maybe_event {
                    Some(Ok(event)) => Tick::Input(event),
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "terminal input error");
                        break;
                    }
                    None => break,
                },
                event = self.controller.next_event(), if subscribed => Tick::Stream(event),
                _ = sleep_until_opt(deadline) => Tick::Flush,
            };

            match tick {
                Tick::Input(event) => self.handle_input(event).await?,
                Tick::Stream(Some(event)) => {
                    if self.controller.handle_event(event) == Followup::RefetchList {
                        self.controller.refresh().await?;
                    }
                }
                Tick::Stream(None) => {
                    // Stream ended; nothing further will arrive until the
                    // user selects another review.
                }
                Tick::Flush => {
                    self.controller.flush();
                    self.maybe_request_variation().await;
                }
            }
        }
        Ok(())
    }

    async fn handle_input(&mut self, event: Event) -> anyhow::Result<()> {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return Ok(());
        };

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Left => {
                if let Some(parent) = self.tree.node(self.cur).parent {
                    self.cur = parent;
                    self.maybe_request_variation().await;
                }
            }
            KeyCode::Right => {
                let node = self.tree.node(self.cur);
                if let Some(next) = node.trunk_next.or_else(|| node.children.first().copied()) {
                    self.cur = next;
                    self.maybe_request_variation().await;
                }
            }
            KeyCode::Home => self.cur = self.tree.root(),
            KeyCode::End => {
                let len = self.tree.trunk_len() as u32;
                if let Some(tip) = self.tree.trunk_node_at(len) {
                    self.cur = tip;
                }
            }
            KeyCode::Char('s') => {
                self.prefs.use_score = !self.prefs.use_score;
                self.save_prefs();
            }
            KeyCode::Char('t') => {
                self.prefs.show_table = !self.prefs.show_table;
                self.save_prefs();
            }
            KeyCode::Char('n') => {
                // Cycle through the available reviews.
                if !self.controller.reviews.is_empty() {
                    let next = self
                        .controller
                        .selected
                        .map(|i| (i + 1) % self.controller.reviews.len())
                        .unwrap_or(0);
                    self.controller.select(next).await?;
                }
            }
            KeyCode::Char('f') => {
                self.request_review(RequestedKind::Fast).await?;
            }
            KeyCode::Char('F') => {
                self.request_review(RequestedKind::Full).await?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Ask for a new review, telling the user when the controller refuses
    /// locally rather than sending the request.
    async fn request_review(&mut self, kind: RequestedKind) -> anyhow::Result<()> {
        self.status = if self.controller.request_review(kind).await? {
            None
        } else {
            Some("Requesting AI reviews requires signing in as a site supporter".to_string())
        };
        Ok(())
    }

    fn save_prefs(&self) {
        if let Err(e) = save_preferences(&self.prefs) {
            tracing::warn!(error = %e, "failed to persist preferences");
        }
    }

    fn board(&self) -> Board {
        Board::at_node(
            self.controller.config.width,
            self.controller.config.height,
            &self.tree,
            self.cur,
        )
    }

    fn annotations(&self, board: &Board) -> Option<AnnotateOutcome> {
        let review = self.controller.active.as_ref()?;
        Some(annotate(&AnnotateContext {
            review,
            tree: &self.tree,
            cur: self.cur,
            board,
            use_score: self.prefs.use_score,
            variation_move_count: self.prefs.variation_move_count,
        }))
    }

    /// After landing on an unanalyzed variation, ask the backend for
    /// on-demand analysis. Gating and deduplication live in the controller.
    async fn maybe_request_variation(&mut self) {
        let board = self.board();
        let needs = self
            .annotations(&board)
            .is_some_and(|o| o.needs_variation_analysis);
        if !needs {
            return;
        }
        match self.controller.request_variation(&self.tree, self.cur).await {
            Ok(true) => tracing::info!("requested variation analysis"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "variation analysis request failed"),
        }
    }

    fn summary(&self) -> Option<SummaryTable> {
        let review = self.controller.active.as_ref()?;
        Some(summarize(&SummaryInputs {
            review,
            config: &self.controller.config,
            move_players: &self.tree.trunk_players(),
            trunk_len: self.tree.trunk_len(),
        }))
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let board = self.board();
        let outcome = self.annotations(&board);
        let annotations = outcome.as_ref().map(|o| &o.annotations);

        let board_width = u16::from(self.controller.config.width) * 2 + 2;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(board_width), Constraint::Min(30)])
            .split(frame.area());

        frame.render_widget(
            GobanPanel {
                board: &board,
                annotations,
                ghost_first: self.tree.next_player(self.cur),
                last_move: self.tree.node(self.cur).mv.and_then(|m| m.coord()),
            },
            chunks[0],
        );

        let show_table = self.prefs.show_table && self.controller.user.can_view_summary_table();
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints(if show_table {
                vec![
                    Constraint::Min(10),
                    Constraint::Length(7),
                    Constraint::Length(12),
                ]
            } else {
                vec![Constraint::Min(10), Constraint::Length(7)]
            })
            .split(chunks[1]);

        let review = self.controller.active.as_ref();
        let keys = review
            .map(|r| key_moves(&self.tree, r))
            .unwrap_or_default();
        let (win_rate, score) = annotations
            .map(|a| (a.win_rate, a.score))
            .unwrap_or((0.5, 0.0));

        frame.render_widget(
            ReviewInfoPanel {
                review,
                reviews: &self.controller.reviews,
                selected: self.controller.selected,
                reviewing: self.controller.reviewing,
                key_moves: &keys,
                win_rate,
                score,
                use_score: self.prefs.use_score,
                board_height: self.controller.config.height,
                status: self.status.as_deref(),
            },
            right[0],
        );

        if let Some(review) = review {
            let variation = analysis::variation_chart_entries(review, &self.tree, self.cur);
            frame.render_widget(
                ReviewChart {
                    review,
                    current_move: self.tree.node(self.cur).move_number,
                    use_score: self.prefs.use_score,
                    key_moves: &keys.iter().map(|k| k.move_number).collect::<Vec<_>>(),
                    variation: &variation,
                },
                right[1],
            );
        }

        if show_table {
            if let Some(table) = self.summary() {
                frame.render_widget(SummaryTablePanel { table: &table }, right[2]);
            }
        }
    }
}

async fn sleep_until_opt(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
