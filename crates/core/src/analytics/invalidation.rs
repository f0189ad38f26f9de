//! Invalidation rules: which domains a change makes stale.

use dashsync_domain::{AnalyticsDomain, DashboardAction, InvalidationReason};

/// Domains whose cached data derives from `domain` and must be dropped when
/// `domain` is mutated.
pub const fn dependent_domains(domain: AnalyticsDomain) -> &'static [AnalyticsDomain] {
    use AnalyticsDomain::{Campaigns, CrossDomain, Leads, Mailboxes};

    match domain {
        AnalyticsDomain::Campaigns => &[Leads, CrossDomain],
        AnalyticsDomain::Leads => &[Campaigns, CrossDomain],
        AnalyticsDomain::Domains => &[Mailboxes, CrossDomain],
        AnalyticsDomain::Mailboxes => &[CrossDomain],
        AnalyticsDomain::Templates => &[Campaigns, CrossDomain],
        AnalyticsDomain::Billing | AnalyticsDomain::CrossDomain => &[],
    }
}

/// Domains an invalidation touches, in declaration order.
///
/// No domain means every domain. Only [`InvalidationReason::Mutation`]
/// cascades to dependents.
pub fn target_domains(
    domain: Option<AnalyticsDomain>,
    reason: InvalidationReason,
) -> Vec<AnalyticsDomain> {
    let Some(domain) = domain else {
        return AnalyticsDomain::ALL.to_vec();
    };

    let cascade: &[AnalyticsDomain] =
        if reason == InvalidationReason::Mutation { dependent_domains(domain) } else { &[] };

    AnalyticsDomain::ALL
        .iter()
        .copied()
        .filter(|candidate| *candidate == domain || cascade.contains(candidate))
        .collect()
}

/// Domain whose data a dashboard action changes.
pub const fn action_domain(action: DashboardAction) -> AnalyticsDomain {
    match action {
        DashboardAction::CampaignLaunched
        | DashboardAction::CampaignPaused
        | DashboardAction::CampaignEdited => AnalyticsDomain::Campaigns,
        DashboardAction::LeadsImported => AnalyticsDomain::Leads,
        DashboardAction::DomainAdded | DashboardAction::DomainVerified => AnalyticsDomain::Domains,
        DashboardAction::MailboxConnected | DashboardAction::WarmupToggled => {
            AnalyticsDomain::Mailboxes
        }
        DashboardAction::TemplateSaved => AnalyticsDomain::Templates,
        DashboardAction::PlanChanged | DashboardAction::PaymentMethodUpdated => {
            AnalyticsDomain::Billing
        }
    }
}
