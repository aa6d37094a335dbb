//! The multi-step quote wizard: a linear state machine collecting shipment
//! parameters, gating each step, attaching the estimate, and performing the
//! single persistence write.

use tracing::debug;

use crate::domain::estimate::estimate;
use crate::domain::validation::{parse_positive, validate_quote, ValidationErrors};
use crate::domain::{QuoteForm, QuotePrefill, SpecialRequirement};
use crate::infra::store::{QuoteStore, StoreError};

/// Wizard steps in order. `Confirmed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardStep {
    SelectService,
    RouteDetails,
    CargoDetails,
    ContactInfo,
    EstimateReview,
    Confirmed,
}

impl WizardStep {
    /// 1-based position for "Step n of 5" progress displays; the
    /// confirmation screen sits outside the numbered flow.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::SelectService => 1,
            WizardStep::RouteDetails => 2,
            WizardStep::CargoDetails => 3,
            WizardStep::ContactInfo => 4,
            WizardStep::EstimateReview => 5,
            WizardStep::Confirmed => 6,
        }
    }

    fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectService => Some(WizardStep::RouteDetails),
            WizardStep::RouteDetails => Some(WizardStep::CargoDetails),
            WizardStep::CargoDetails => Some(WizardStep::ContactInfo),
            WizardStep::ContactInfo => Some(WizardStep::EstimateReview),
            WizardStep::EstimateReview => Some(WizardStep::Confirmed),
            WizardStep::Confirmed => None,
        }
    }

    fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectService => None,
            WizardStep::RouteDetails => Some(WizardStep::SelectService),
            WizardStep::CargoDetails => Some(WizardStep::RouteDetails),
            WizardStep::ContactInfo => Some(WizardStep::CargoDetails),
            WizardStep::EstimateReview => Some(WizardStep::ContactInfo),
            // The record is already persisted; there is no way back.
            WizardStep::Confirmed => None,
        }
    }
}

/// What an `advance` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Entered the next step.
    Moved(WizardStep),
    /// The current step's gate failed; `errors()` has the details.
    Blocked,
    /// The request was persisted; the wizard is now `Confirmed`.
    Submitted,
    /// A submission is already in flight; nothing happened.
    InFlight,
    /// Already confirmed; nothing left to do.
    Done,
}

pub struct QuoteWizard<S> {
    store: S,
    step: WizardStep,
    form: QuoteForm,
    estimated_cost: Option<u32>,
    errors: ValidationErrors,
    loading: bool,
}

impl<S: QuoteStore> QuoteWizard<S> {
    pub fn new(store: S) -> Self {
        Self::with_form(store, QuoteForm::default())
    }

    /// Start the wizard from a quick-quote hand-off.
    pub fn with_prefill(store: S, prefill: QuotePrefill) -> Self {
        Self::with_form(store, QuoteForm::from_prefill(prefill))
    }

    fn with_form(store: S, form: QuoteForm) -> Self {
        Self {
            store,
            step: WizardStep::SelectService,
            form,
            estimated_cost: None,
            errors: ValidationErrors::default(),
            loading: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &QuoteForm {
        &self.form
    }

    /// Mutable access for field edits. Collected values belong to the
    /// wizard; edits take effect at the next `advance`.
    pub fn form_mut(&mut self) -> &mut QuoteForm {
        &mut self.form
    }

    pub fn toggle_requirement(&mut self, requirement: SpecialRequirement) {
        self.form.toggle_requirement(requirement);
    }

    /// Estimate attached on entering the review step.
    pub fn estimated_cost(&self) -> Option<u32> {
        self.estimated_cost
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// True while the persistence write is in flight; submit controls should
    /// be disabled.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Move one step back, keeping every collected value. Returns `false`
    /// from the first step and from the confirmation screen.
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                self.errors = ValidationErrors::default();
                self.step = previous;
                true
            }
            None => false,
        }
    }

    /// Try to leave the current step. Gates are per step; the full
    /// validation pass runs when leaving the contact step, and the single
    /// persistence write happens when leaving the review step. On a store
    /// error the wizard stays in `EstimateReview` with nothing lost, and the
    /// user decides whether to submit again.
    pub async fn advance(&mut self) -> Result<Advance, StoreError> {
        if self.loading {
            return Ok(Advance::InFlight);
        }
        self.errors = ValidationErrors::default();

        match self.step {
            WizardStep::SelectService => {
                if self.form.service_type.is_none() {
                    self.errors.insert("service_type", "Select a service type");
                    return Ok(Advance::Blocked);
                }
                Ok(self.move_on())
            }
            WizardStep::RouteDetails => {
                if self.form.origin.trim().is_empty() {
                    self.errors
                        .insert("origin", "Enter the origin city or location");
                }
                if self.form.destination.trim().is_empty() {
                    self.errors
                        .insert("destination", "Enter the destination city or location");
                }
                if !self.errors.is_empty() {
                    return Ok(Advance::Blocked);
                }
                Ok(self.move_on())
            }
            WizardStep::CargoDetails => {
                if self.form.weight.trim().is_empty() {
                    self.errors.insert("weight", "Weight is required");
                    return Ok(Advance::Blocked);
                }
                Ok(self.move_on())
            }
            WizardStep::ContactInfo => {
                let errors = validate_quote(&self.form);
                if !errors.is_empty() {
                    self.errors = errors;
                    return Ok(Advance::Blocked);
                }
                let (Some(service), Some(weight)) = (
                    self.form.service_type,
                    parse_positive(&self.form.weight),
                ) else {
                    return Ok(Advance::Blocked);
                };
                let cost = estimate(service, weight, self.form.special_requirements.len());
                debug!(service = service.slug(), cost, "estimate attached");
                self.estimated_cost = Some(cost);
                Ok(self.move_on())
            }
            WizardStep::EstimateReview => {
                let Some(cost) = self.estimated_cost else {
                    self.errors
                        .insert("estimated_cost", "Estimate is missing; go back one step");
                    return Ok(Advance::Blocked);
                };
                let request = match self.form.build_request(cost) {
                    Ok(request) => request,
                    Err(errors) => {
                        self.errors = errors;
                        return Ok(Advance::Blocked);
                    }
                };

                self.loading = true;
                let written = self.store.insert_quote(&request).await;
                self.loading = false;

                written?;
                debug!("quote request persisted");
                self.step = WizardStep::Confirmed;
                Ok(Advance::Submitted)
            }
            WizardStep::Confirmed => Ok(Advance::Done),
        }
    }

    fn move_on(&mut self) -> Advance {
        match self.step.next() {
            Some(next) => {
                self.step = next;
                Advance::Moved(next)
            }
            None => Advance::Done,
        }
    }
}
