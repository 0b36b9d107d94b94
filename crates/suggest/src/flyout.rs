//! Flyout: a blurb and a thumbnail for the highlighted row, rendered once
//! both have arrived.

use std::time::Instant;

use bus::{CoreCommand, CoreEvent};
use core_types::ResourceKind;
use input_core::InputId;
use url::Url;

use crate::candidate::NamedRef;
use crate::engine::{InFlight, Purpose, SuggestEngine};
use crate::error::{Result, SuggestError};
use crate::field::FlyoutJoin;
use crate::overlay::FlyoutView;
use crate::response;
use crate::timers::TimerKind;
use crate::transform::LineClass;
use crate::urls;

/// Blurb for a candidate without an article.
pub(crate) const NBSP: &str = "&nbsp;";
/// Image source for a candidate without an image.
pub(crate) const NO_IMAGE: &str = "#";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Part {
    Blurb,
    Image,
}

impl SuggestEngine {
    /// Start a flyout for `row`, replacing any pending one.
    pub(crate) fn request_flyout(&mut self, input: InputId, row: usize, now: Instant) {
        let ticket = self.next_ticket();
        let Some(field) = self.fields.get_mut(&input) else {
            return;
        };
        let Some(candidate_id) = field
            .overlay
            .rows
            .get(row)
            .and_then(|r| r.row.candidate())
            .and_then(|c| c.id.clone())
        else {
            return;
        };
        field.flyout = Some(FlyoutJoin::new(ticket, row, candidate_id));
        let delay = field.options.timings.flyout_delay;
        self.timers
            .schedule(input, TimerKind::Flyout { ticket }, now + delay);
    }

    /// The flyout delay elapsed: fetch or look up both parts.
    pub(crate) fn flyout_resources(&mut self, input: InputId, ticket: u64) {
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        let Some(join) = field.flyout.as_ref().filter(|j| j.ticket == ticket) else {
            return;
        };
        let Some(candidate) = field
            .overlay
            .rows
            .get(join.row)
            .and_then(|r| r.row.candidate())
            .filter(|c| c.id.as_deref() == Some(join.candidate_id.as_str()))
        else {
            log::trace!(target: "suggest.flyout", "{input}: row changed before flyout #{ticket}");
            return;
        };
        let article = candidate.article_id().map(str::to_string);
        let image = candidate.image_id().map(str::to_string);
        let epoch = field.epoch;

        let blurb_url = article
            .as_deref()
            .map(|id| urls::blurb_url(&field.options, id));
        let thumb_url = image
            .as_deref()
            .map(|id| urls::thumbnail_url(&field.options, id));

        match (article, blurb_url) {
            (Some(article_id), Some(url)) => {
                if let Some(body) = self.resources.blurb(&article_id).map(str::to_string) {
                    self.flyout_arrive(input, ticket, Part::Blurb, body);
                    return self.flyout_image(input, ticket, epoch, image, thumb_url);
                }
                match url {
                    Ok(url) => {
                        let request_id = self.next_request_id();
                        self.in_flight.insert(
                            request_id,
                            InFlight {
                                input,
                                epoch,
                                purpose: Purpose::Blurb { article_id, ticket },
                            },
                        );
                        self.send(CoreCommand::Fetch {
                            request_id,
                            kind: ResourceKind::Blurb,
                            url: url.into(),
                        });
                    }
                    Err(err) => {
                        log::warn!(target: "suggest.flyout", "{input}: bad blurb url for {article_id}: {err}");
                    }
                }
            }
            _ => self.flyout_arrive(input, ticket, Part::Blurb, NBSP.to_string()),
        }
        self.flyout_image(input, ticket, epoch, image, thumb_url);
    }

    fn flyout_image(
        &mut self,
        input: InputId,
        ticket: u64,
        epoch: u64,
        image: Option<String>,
        url: Option<Result<Url>>,
    ) {
        let (Some(image_id), Some(url)) = (image, url) else {
            return self.flyout_arrive(input, ticket, Part::Image, NO_IMAGE.to_string());
        };
        if let Some(cached) = self.resources.thumbnail(&image_id).map(str::to_string) {
            return self.flyout_arrive(input, ticket, Part::Image, cached);
        }
        let url = match url {
            Ok(url) => String::from(url),
            Err(err) => {
                log::warn!(target: "suggest.flyout", "{input}: bad thumbnail url for {image_id}: {err}");
                return;
            }
        };
        let request_id = self.next_request_id();
        self.in_flight.insert(
            request_id,
            InFlight {
                input,
                epoch,
                purpose: Purpose::Thumbnail {
                    image_id,
                    url: url.clone(),
                    ticket,
                },
            },
        );
        self.send(CoreCommand::Fetch {
            request_id,
            kind: ResourceKind::Thumbnail,
            url,
        });
    }

    fn flyout_arrive(&mut self, input: InputId, ticket: u64, part: Part, value: String) {
        let Some(join) = self
            .fields
            .get_mut(&input)
            .and_then(|f| f.flyout.as_mut())
            .filter(|j| j.ticket == ticket)
        else {
            log::trace!(target: "suggest.flyout", "{input}: {part:?} for stale flyout #{ticket}");
            return;
        };
        match part {
            Part::Blurb => join.blurb = Some(value),
            Part::Image => join.image = Some(value),
        }
        if join.is_complete() {
            self.flyout_show(input);
        }
    }

    /// Render the completed join if its row is still the highlighted one.
    fn flyout_show(&mut self, input: InputId) {
        let Some(field) = self.fields.get_mut(&input) else {
            return;
        };
        let Some(join) = field.flyout.take() else {
            return;
        };
        let overlay = &field.overlay;
        let rendered = overlay.rows.get(join.row);
        let candidate = rendered
            .and_then(|r| r.row.candidate())
            .filter(|c| c.id.as_deref() == Some(join.candidate_id.as_str()));
        let (Some(rendered), Some(candidate)) = (rendered, candidate) else {
            return;
        };
        if !overlay.visible || overlay.selected != Some(join.row) {
            log::trace!(target: "suggest.flyout", "{input}: flyout #{} no longer wanted", join.ticket);
            return;
        }

        let name = rendered
            .fragment
            .text(LineClass::Name)
            .unwrap_or_else(|| candidate.display_name().to_string());
        let join_names = |refs: &[NamedRef]| {
            refs.iter()
                .map(|r| r.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let image = join.image.unwrap_or_default();
        let view = FlyoutView {
            row: join.row,
            name,
            view_url: urls::view_url(&field.options, &join.candidate_id),
            image_url: (image != NO_IMAGE).then_some(image),
            types: join_names(&candidate.types),
            domains: join_names(&candidate.domains),
            blurb: join.blurb.unwrap_or_default(),
            width: field.options.width,
        };
        log::debug!(target: "suggest.flyout", "{input}: flyout for row {}", view.row);
        field.overlay.flyout = Some(view);
    }

    pub(crate) fn on_blurb_response(
        &mut self,
        input: InputId,
        ticket: u64,
        article_id: String,
        evt: CoreEvent,
    ) {
        let parsed = match evt {
            CoreEvent::FetchDone { status, body, .. } if (200..300).contains(&status) => {
                response::parse_blurb(&body)
            }
            CoreEvent::FetchDone { status, url, .. } => {
                Err(SuggestError::Transport(format!("HTTP {status} from {url}")))
            }
            CoreEvent::FetchError { error, .. } => Err(SuggestError::Transport(error)),
        };
        match parsed {
            Ok(body) => {
                self.resources.store_blurb(article_id, body.clone());
                self.flyout_arrive(input, ticket, Part::Blurb, body);
            }
            Err(err) => {
                log::warn!(target: "suggest.flyout", "{input}: blurb for {article_id} failed: {err}");
            }
        }
    }

    /// The thumbnail fetch finished; success or not, the image is as loaded as it gets.
    pub(crate) fn on_thumbnail_response(
        &mut self,
        input: InputId,
        ticket: u64,
        image_id: String,
        url: String,
    ) {
        self.resources.store_thumbnail(image_id, url.clone());
        self.flyout_arrive(input, ticket, Part::Image, url);
    }
}
