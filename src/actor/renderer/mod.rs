//! Page Renderer
//!
//! One render session per artifact: open the document, then draw pages in
//! strict ascending order, each to completion before the next is requested.
//! The sequential loop bounds peak resource usage and matches reading order.
//!
//! Cancellation is cooperative and artifact-supersession driven: the moment
//! a newer artifact becomes live, the old session is retired via its
//! liveness token. The task checks the token before requesting each page and
//! again after each awaited call — a pending decode finishes, its result is
//! discarded.


use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{DisplayMsg, RenderMsg};
use crate::artifact::ArtifactHandle;
use crate::render::session::{RenderSession, RenderStatus, RenderedPage};
use crate::render::{Decoder, PageGeometry, Surface};
use crate::session::PreviewSession;

pub struct PageRenderer<D: Decoder> {
    rx: mpsc::Receiver<RenderMsg>,
    decoder: Arc<D>,
    session: Arc<PreviewSession>,
    display_tx: mpsc::Sender<DisplayMsg>,
    scale: f32,
}

impl<D: Decoder> PageRenderer<D> {
    pub fn new(
        rx: mpsc::Receiver<RenderMsg>,
        decoder: Arc<D>,
        session: Arc<PreviewSession>,
        display_tx: mpsc::Sender<DisplayMsg>,
        scale: f32,
    ) -> Self {
        Self {
            rx,
            decoder,
            session,
            display_tx,
            scale,
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                RenderMsg::Render(artifact) => self.start(artifact),
                RenderMsg::Shutdown => break,
            }
        }
        // Stop any in-progress session from appending past shutdown.
        if let Some(current) = self.session.render_session() {
            current.retire();
        }
        crate::debug!("render"; "renderer stopped");
    }

    /// Start a fresh session for a newly live artifact. Installing it in the
    /// shared slot retires the previous session.
    fn start(&mut self, artifact: Arc<ArtifactHandle>) {
        let render = Arc::new(RenderSession::new(artifact.id()));
        self.session.set_render_session(Arc::clone(&render));
        tokio::spawn(run_session(
            Arc::clone(&self.decoder),
            artifact,
            render,
            self.display_tx.clone(),
            self.scale,
        ));
    }
}

/// Drive one artifact through open → pages `1..=n`.
async fn run_session<D: Decoder>(
    decoder: Arc<D>,
    artifact: Arc<ArtifactHandle>,
    render: Arc<RenderSession>,
    display_tx: mpsc::Sender<DisplayMsg>,
    scale: f32,
) {
    render.set_status(RenderStatus::Loading);

    let document = match decoder.open(artifact.bytes()).await {
        Ok(document) => document,
        Err(e) => {
            fail(&render, &display_tx, e.to_string()).await;
            return;
        }
    };
    if !render.is_live() {
        crate::debug!("render"; "artifact #{} superseded during open", artifact.id());
        return;
    }

    let pages = decoder.page_count(&document);
    render.begin_rendering(pages);
    let _ = display_tx.send(DisplayMsg::RenderStarted { pages }).await;

    for index in 1..=pages {
        if !render.is_live() {
            crate::debug!("render"; "artifact #{} superseded at page {}", artifact.id(), index);
            return;
        }

        let page = match decoder.page(&document, index).await {
            Ok(page) => page,
            Err(e) => {
                fail(&render, &display_tx, e.to_string()).await;
                return;
            }
        };

        let geometry = PageGeometry::of(page.size, scale);
        let mut surface = Surface::new(geometry);
        let drawn = decoder.draw(&document, &page, &mut surface).await;

        // The awaited draw was allowed to finish; if the session was retired
        // meanwhile, its result is discarded rather than displayed.
        if !render.is_live() {
            crate::debug!("render"; "artifact #{} superseded after drawing page {}", artifact.id(), index);
            return;
        }
        if let Err(e) = drawn {
            // Already-rendered pages remain displayed.
            fail(&render, &display_tx, e.to_string()).await;
            return;
        }

        render.push_page(RenderedPage { index, surface });
        let _ = display_tx
            .send(DisplayMsg::PageRendered { index, pages })
            .await;
    }

    render.set_status(RenderStatus::Complete);
    let _ = display_tx.send(DisplayMsg::RenderComplete { pages }).await;
}

async fn fail(
    render: &RenderSession,
    display_tx: &mpsc::Sender<DisplayMsg>,
    message: String,
) {
    // A retired session is never mutated, and its failure is not news.
    if !render.is_live() {
        return;
    }
    render.set_status(RenderStatus::Error(message.clone()));
    let _ = display_tx.send(DisplayMsg::RenderFailed { message }).await;
}
