//! Multi-tier tracker failover.
//!
//! Tiers are tried in order, URLs within a tier in order. A success keeps the
//! cursor where it is, a failure moves it one URL forward, wrapping from the last
//! tier to the first. Once every URL failed in a row the list is `AllFailed`
//! until [`AnnounceList::reset_tier`] is called.

use rand::{seq::SliceRandom, Rng};

use crate::{config::TierEligibility, event::AnnounceEvent};

/// Whether a tier should still receive a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventSlot {
    Ineligible,
    /// Eligible, but the tier has not acknowledged `started` yet.
    Dormant,
    Pending,
    /// Delivered, or given up on after the whole tier failed.
    Spent,
}

impl EventSlot {
    fn initial(eligible: bool) -> Self {
        if eligible {
            EventSlot::Dormant
        } else {
            EventSlot::Ineligible
        }
    }

    fn wake(&mut self) {
        if *self == EventSlot::Dormant {
            *self = EventSlot::Pending;
        }
    }

    fn spend(&mut self) {
        if *self != EventSlot::Ineligible {
            *self = EventSlot::Spent;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tier {
    urls: Vec<String>,
    failure_streak: u32,
    stopped: EventSlot,
    completed: EventSlot,
}

impl Tier {
    fn new(urls: Vec<String>, eligible: bool) -> Self {
        Tier {
            urls,
            failure_streak: 0,
            stopped: EventSlot::initial(eligible),
            completed: EventSlot::initial(eligible),
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn failure_streak(&self) -> u32 {
        self.failure_streak
    }

    pub fn accepts_stopped_event(&self) -> bool {
        self.stopped == EventSlot::Pending
    }

    pub fn accepts_completed_event(&self) -> bool {
        self.completed == EventSlot::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Active { tier: usize, url: usize },
    AllFailed,
}

#[derive(Debug, Clone)]
pub struct AnnounceList {
    tiers: Vec<Tier>,
    cursor: Cursor,
    event: AnnounceEvent,
    failures_since_success: usize,
}

impl AnnounceList {
    pub fn new(tiers: Vec<Vec<String>>, eligibility: TierEligibility) -> Self {
        let tiers: Vec<Tier> = tiers
            .into_iter()
            .map(|urls| {
                urls.into_iter()
                    .filter(|url| !url.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|urls| !urls.is_empty())
            .enumerate()
            .map(|(index, urls)| {
                let eligible = match eligibility {
                    TierEligibility::FirstTier => index == 0,
                    TierEligibility::AllTiers => true,
                };
                Tier::new(urls, eligible)
            })
            .collect();

        let mut list = AnnounceList {
            tiers,
            cursor: Cursor::AllFailed,
            event: AnnounceEvent::Started,
            failures_since_success: 0,
        };
        list.reset_tier();
        list
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn count_urls(&self) -> usize {
        self.tiers.iter().map(|tier| tier.urls.len()).sum()
    }

    pub fn failure_streak(&self, tier: usize) -> Option<u32> {
        self.tiers.get(tier).map(Tier::failure_streak)
    }

    /// URL under the cursor, `None` once every tier failed.
    pub fn announce_url(&self) -> Option<&str> {
        match self.cursor {
            Cursor::Active { tier, url } => Some(self.tiers[tier].urls[url].as_str()),
            Cursor::AllFailed => None,
        }
    }

    pub fn event(&self) -> AnnounceEvent {
        self.event
    }

    pub fn set_event(&mut self, event: AnnounceEvent) {
        self.event = event;
    }

    pub fn all_tiers_failed(&self) -> bool {
        self.cursor == Cursor::AllFailed
    }

    pub fn announce_success(&mut self) {
        let Cursor::Active { tier, url } = self.cursor else {
            return;
        };
        let event = self.event;
        let current = &mut self.tiers[tier];
        current.failure_streak = 0;
        self.failures_since_success = 0;

        match event {
            AnnounceEvent::Started => {
                current.stopped.wake();
                current.completed.wake();
            }
            AnnounceEvent::StartedAfterCompletion => {
                current.stopped.wake();
                current.completed.spend();
            }
            AnnounceEvent::Completed => current.completed.spend(),
            AnnounceEvent::Stopped => {
                current.stopped.spend();
                // leaving the swarm, nobody should hear `completed` afterwards
                for tier in &mut self.tiers {
                    tier.completed.spend();
                }
            }
            AnnounceEvent::None => {}
        }
        self.event = event.after_success();

        // the tracker that answered goes first in its tier (BEP 12)
        let current = &mut self.tiers[tier];
        let answered = current.urls.remove(url);
        current.urls.insert(0, answered);
        self.cursor = Cursor::Active { tier, url: 0 };
    }

    pub fn announce_failure(&mut self) {
        let Cursor::Active { tier, url } = self.cursor else {
            return;
        };
        let current = &mut self.tiers[tier];
        current.failure_streak += 1;
        self.failures_since_success += 1;

        if url + 1 < current.urls.len() {
            self.cursor = Cursor::Active { tier, url: url + 1 };
        } else {
            match self.event {
                AnnounceEvent::Stopped => current.stopped.spend(),
                AnnounceEvent::Completed => current.completed.spend(),
                _ => {}
            }
            self.event = self.event.after_tier_exhausted();
            self.cursor = Cursor::Active {
                tier: (tier + 1) % self.tiers.len(),
                url: 0,
            };
        }

        // a terminal event still walks the rest of its tier
        if self.failures_since_success >= self.count_urls() && !self.event.is_terminal() {
            self.cursor = Cursor::AllFailed;
        }
    }

    /// Back to the first URL of the first tier. Pending events and eligibility are kept.
    pub fn reset_tier(&mut self) {
        self.failures_since_success = 0;
        for tier in &mut self.tiers {
            tier.failure_streak = 0;
        }
        self.cursor = if self.tiers.is_empty() {
            Cursor::AllFailed
        } else {
            Cursor::Active { tier: 0, url: 0 }
        };
    }

    /// Randomizes URL order within each tier. Tier order is left alone.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for tier in &mut self.tiers {
            tier.urls.shuffle(rng);
        }
        if let Cursor::Active { tier, .. } = self.cursor {
            self.cursor = Cursor::Active { tier, url: 0 };
        }
    }

    pub fn current_tier_accepts_stopped_event(&self) -> bool {
        self.current_tier().is_some_and(Tier::accepts_stopped_event)
    }

    pub fn current_tier_accepts_completed_event(&self) -> bool {
        self.current_tier()
            .is_some_and(Tier::accepts_completed_event)
    }

    pub fn move_to_stopped_allowed_tier(&mut self) {
        self.move_to_allowed_tier(Tier::accepts_stopped_event);
    }

    pub fn move_to_completed_allowed_tier(&mut self) {
        self.move_to_allowed_tier(Tier::accepts_completed_event);
    }

    pub fn count_stopped_allowed_tier(&self) -> usize {
        self.tiers
            .iter()
            .filter(|tier| tier.accepts_stopped_event())
            .count()
    }

    pub fn count_completed_allowed_tier(&self) -> usize {
        self.tiers
            .iter()
            .filter(|tier| tier.accepts_completed_event())
            .count()
    }

    fn current_tier(&self) -> Option<&Tier> {
        match self.cursor {
            Cursor::Active { tier, .. } => self.tiers.get(tier),
            Cursor::AllFailed => None,
        }
    }

    /// Moves to the nearest tier at or after the current one (wrapping) that accepts
    /// the event. Stays put when the current tier already accepts it or none does.
    fn move_to_allowed_tier(&mut self, accepts: fn(&Tier) -> bool) {
        if self.current_tier().is_some_and(accepts) {
            return;
        }
        let start = match self.cursor {
            Cursor::Active { tier, .. } => tier,
            Cursor::AllFailed => 0,
        };
        let count = self.tiers.len();
        let found = (0..count)
            .map(|offset| (start + offset) % count)
            .find(|&index| accepts(&self.tiers[index]));
        if let Some(tier) = found {
            self.cursor = Cursor::Active { tier, url: 0 };
        }
    }
}
