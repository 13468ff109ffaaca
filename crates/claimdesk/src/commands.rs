// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand definitions and their handlers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};
use claimdesk::DeskContext;
use claimdesk_bus::Topic;
use claimdesk_claims::{ClaimRequest, ContinuousCancel, Escalation, HandoffKind, ProviderHandoff};
use claimdesk_core::{
    ActiveClaim, AgentId, Claim, ClaimContext, Customer, CustomerId, DeskError, Phone, TicketId,
    TicketItem, TicketService,
};
use claimdesk_reminders::{FetchOutcome, Reminder};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

/// How long `reminders count` waits on a fetch already in flight.
const COUNT_WAIT: Duration = Duration::from_secs(10);

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Claim a customer under an existing ticket.
    Claim {
        #[command(flatten)]
        customer: CustomerArgs,
        /// Ticket the claim is worked under.
        #[arg(long)]
        ticket: Option<String>,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Open a ticket for a customer and claim them under it.
    Open {
        #[command(flatten)]
        customer: CustomerArgs,
        /// Ticket sub-type name.
        #[arg(long)]
        subtype: String,
        /// Note added to the new ticket.
        #[arg(long)]
        note: Option<String>,
        /// Open a ticket even if the customer already has one.
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Release a claim without touching its ticket.
    Release {
        #[arg(long)]
        phone: String,
    },
    /// Resolve the claim's ticket and release the claim.
    Resolve {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        ticket: Option<String>,
        /// Resolution sub-type name.
        #[arg(long)]
        subtype: String,
    },
    /// Hand a claim to another agent.
    Transfer {
        #[arg(long)]
        phone: String,
        /// Agent receiving the claim.
        #[arg(long)]
        to: String,
        /// Removal topic announced to other views.
        #[arg(long, default_value = "transferredRemove")]
        topic: String,
    },
    /// Escalate a claim with a note.
    Escalate {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        ticket: String,
        /// Agent or queue receiving the escalation.
        #[arg(long)]
        to: String,
        #[arg(long)]
        note: String,
    },
    /// Cancel a continuous order and resolve the claim.
    CancelContinuous {
        #[command(flatten)]
        active: ActiveArgs,
        #[arg(long)]
        order: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Decline a QA order and resolve the claim.
    DeclineQa {
        #[command(flatten)]
        active: ActiveArgs,
        #[arg(long)]
        order: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Return or transfer the customer to an external provider.
    Provider {
        #[command(flatten)]
        active: ActiveArgs,
        #[arg(long, value_enum)]
        kind: HandoffArg,
        #[arg(long)]
        provider: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Manage follow-up reminders.
    Reminders {
        #[command(subcommand)]
        command: ReminderCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReminderCommand {
    /// Print the number of unresolved reminders.
    Count,
    /// List reminders.
    List {
        /// Include resolved reminders.
        #[arg(long)]
        all: bool,
    },
    /// Schedule a reminder.
    Add {
        #[arg(long)]
        phone: String,
        /// Due time, RFC 3339.
        #[arg(long)]
        due: DateTime<Utc>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Mark a reminder resolved.
    Resolve {
        #[arg(long)]
        id: String,
    },
    /// Delete a reminder.
    Remove {
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct CustomerArgs {
    #[arg(long)]
    phone: String,
    #[arg(long)]
    customer_id: Option<String>,
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Order that triggered the claim.
    #[arg(long)]
    order: Option<String>,
    /// The order is a continuous (recurring) order.
    #[arg(long, requires = "order")]
    continuous: bool,
    #[arg(long)]
    provider: Option<String>,
}

#[derive(Args, Debug)]
pub struct ActiveArgs {
    #[arg(long)]
    phone: String,
    #[arg(long)]
    ticket: Option<String>,
    #[arg(long)]
    customer_id: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum HandoffArg {
    Return,
    Transfer,
}

impl From<HandoffArg> for HandoffKind {
    fn from(arg: HandoffArg) -> Self {
        match arg {
            HandoffArg::Return => HandoffKind::Return,
            HandoffArg::Transfer => HandoffKind::Transfer,
        }
    }
}

impl ContextArgs {
    fn into_context(self) -> ClaimContext {
        ClaimContext {
            order_id: self.order,
            continuous: self.continuous,
            provider: self.provider,
        }
    }
}

/// Runs one subcommand against a started desk.
pub async fn run(desk: &DeskContext, command: Command) -> Result<(), DeskError> {
    match command {
        Command::Claim {
            customer,
            ticket,
            context,
        } => {
            let request = ClaimRequest {
                customer: customer_from(desk, customer)?,
                ticket_id: ticket.map(TicketId),
                context: context.into_context(),
            };
            let claim = desk.claims().claim(request).await?;
            print_claim(&claim)
        }
        Command::Open {
            customer,
            subtype,
            note,
            force,
            context,
        } => {
            let customer = customer_from(desk, customer)?;
            if let Some(customer_id) = &customer.id {
                if !force && desk.tickets().exists(customer_id).await? {
                    let err = DeskError::Validation(
                        "Customer already has an open ticket; use --force to open another".into(),
                    );
                    desk.bus().error(err.user_message());
                    return Err(err);
                }
            }
            let mut items = Vec::new();
            if let Some(order_id) = &context.order {
                items.push(TicketItem::order(order_id.clone()));
            }
            if let Some(note) = note {
                items.push(TicketItem::note(note));
            }
            let claim = desk
                .claims()
                .create_ticket_then_claim(customer, &subtype, &items, context.into_context())
                .await?;
            print_claim(&claim)
        }
        Command::Release { phone } => {
            let phone = parse_phone(desk, &phone)?;
            desk.claims().release(&phone).await
        }
        Command::Resolve {
            phone,
            ticket,
            subtype,
        } => {
            let phone = parse_phone(desk, &phone)?;
            let ticket = ticket.map(TicketId);
            desk.claims()
                .resolve_and_release(&phone, ticket.as_ref(), &subtype)
                .await
        }
        Command::Transfer { phone, to, topic } => {
            let phone = parse_phone(desk, &phone)?;
            desk.claims()
                .transfer(&phone, &AgentId(to), Topic::custom(topic))
                .await
        }
        Command::Escalate {
            phone,
            ticket,
            to,
            note,
        } => {
            let escalation = Escalation {
                phone: parse_phone(desk, &phone)?,
                ticket_id: TicketId(ticket),
                target: AgentId(to),
                note,
            };
            desk.claims().escalate(escalation).await
        }
        Command::CancelContinuous {
            active,
            order,
            reason,
            note,
        } => {
            let active = active_from(desk, active)?;
            let cancel = ContinuousCancel {
                order_id: order,
                reason,
                note,
            };
            let outcome = desk.claims().cancel_continuous(&active, cancel).await?;
            if let Some(Ok(claim)) = &outcome.reclaim {
                print_claim(claim)?;
            }
            Ok(())
        }
        Command::DeclineQa {
            active,
            order,
            reason,
            note,
        } => {
            let active = active_from(desk, active)?;
            desk.claims()
                .decline_qa(&active, &order, &reason, note.as_deref())
                .await
        }
        Command::Provider {
            active,
            kind,
            provider,
            note,
        } => {
            let active = active_from(desk, active)?;
            let handoff = ProviderHandoff {
                kind: kind.into(),
                provider,
                note,
            };
            desk.claims().provider_handoff(&active, handoff).await
        }
        Command::Reminders { command } => run_reminders(desk, command).await,
    }
}

async fn run_reminders(desk: &DeskContext, command: ReminderCommand) -> Result<(), DeskError> {
    let notifier = desk.reminders();
    match command {
        ReminderCommand::Count => {
            let count = current_count(desk).await?;
            println!("{count}");
            Ok(())
        }
        ReminderCommand::List { all } => {
            let reminders = notifier.list(all).await?;
            print_json(&reminders)
        }
        ReminderCommand::Add { phone, due, note } => {
            let phone = parse_phone(desk, &phone)?;
            let saved = notifier.add(&Reminder::new(phone, note, due)).await?;
            print_json(&saved)
        }
        ReminderCommand::Resolve { id } => {
            let reminder = find_reminder(desk, &id).await?;
            notifier.resolve(&reminder).await
        }
        ReminderCommand::Remove { id } => {
            let reminder = find_reminder(desk, &id).await?;
            notifier.remove(&reminder).await
        }
    }
}

/// Fetches the count, waiting on the sign-in fetch if one is outstanding.
async fn current_count(desk: &DeskContext) -> Result<u64, DeskError> {
    let notifier = desk.reminders();
    let (tx, mut rx) = watch::channel(notifier.count());
    let subscriber = notifier.subscribe(move |count| {
        tx.send_replace(count);
    });

    let outcome = notifier.fetch_count().await;
    debug!(?outcome, "reminder count fetch");
    let count = match outcome {
        FetchOutcome::Fetched(n) => Some(n),
        // The outstanding fetch notifies when it lands.
        FetchOutcome::Dropped => match tokio::time::timeout(COUNT_WAIT, rx.changed()).await {
            Ok(Ok(())) => rx.borrow().value(),
            _ => None,
        },
        FetchOutcome::Failed => None,
        FetchOutcome::Discarded => notifier.count().value(),
    };
    notifier.unsubscribe(subscriber);

    count.ok_or_else(|| {
        let err = DeskError::network("Reminder count is unavailable");
        desk.bus().error(err.user_message());
        err
    })
}

async fn find_reminder(desk: &DeskContext, id: &str) -> Result<Reminder, DeskError> {
    let reminders = desk.reminders().list(true).await?;
    reminders
        .into_iter()
        .find(|r| r.id.as_deref() == Some(id))
        .ok_or_else(|| {
            let err = DeskError::Validation(format!("No reminder with id `{id}`"));
            desk.bus().error(err.user_message());
            err
        })
}

/// Parses a phone number, publishing a rejection on the bus.
fn parse_phone(desk: &DeskContext, raw: &str) -> Result<Phone, DeskError> {
    Phone::parse(raw).inspect_err(|err| desk.bus().error(err.user_message()))
}

fn customer_from(desk: &DeskContext, args: CustomerArgs) -> Result<Customer, DeskError> {
    let mut customer = Customer::new(parse_phone(desk, &args.phone)?);
    if let Some(id) = args.customer_id {
        customer = customer.with_id(CustomerId(id));
    }
    if let Some(name) = args.name {
        customer = customer.with_name(name);
    }
    Ok(customer)
}

fn active_from(desk: &DeskContext, args: ActiveArgs) -> Result<ActiveClaim, DeskError> {
    let mut customer = Customer::new(parse_phone(desk, &args.phone)?);
    customer.id = args.customer_id.map(CustomerId);
    Ok(ActiveClaim {
        customer,
        ticket_id: args.ticket.map(TicketId),
    })
}

fn print_claim(claim: &Claim) -> Result<(), DeskError> {
    print_json(claim)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), DeskError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| DeskError::Internal(format!("failed to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use clap::Parser;
    use claimdesk_config::DeskConfig;
    use claimdesk_core::types::service;
    use claimdesk_core::{Envelope, RestMethod};
    use claimdesk_reminders::nouns;
    use claimdesk_test_utils::MockRest;
    use serde_json::json;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> Command {
        TestCli::try_parse_from(std::iter::once("claimdesk").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn continuous_claim_requires_an_order() {
        let result = TestCli::try_parse_from([
            "claimdesk",
            "claim",
            "--phone",
            "5551234567",
            "--continuous",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn transfer_topic_defaults_to_transferred_remove() {
        match parse(&["transfer", "--phone", "5551234567", "--to", "agent7"]) {
            Command::Transfer { topic, .. } => assert_eq!(topic, "transferredRemove"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reminder_due_is_rfc3339() {
        match parse(&[
            "reminders", "add", "--phone", "5551234567", "--due", "2026-03-01T15:00:00Z",
        ]) {
            Command::Reminders {
                command: ReminderCommand::Add { due, note, .. },
            } => {
                assert_eq!(due.to_rfc3339(), "2026-03-01T15:00:00+00:00");
                assert!(note.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(TestCli::try_parse_from([
            "claimdesk", "reminders", "add", "--phone", "1", "--due", "tomorrow"
        ])
        .is_err());
    }

    #[test]
    fn provider_kind_maps_to_handoff() {
        match parse(&[
            "provider", "--phone", "5551234567", "--kind", "return", "--provider", "Dr. Rivera",
        ]) {
            Command::Provider { kind, .. } => {
                assert_eq!(HandoffKind::from(kind), HandoffKind::Return)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn context_args_build_claim_context() {
        let context = ContextArgs {
            order: Some("O-1".into()),
            continuous: true,
            provider: None,
        }
        .into_context();
        assert_eq!(context, ClaimContext::continuous("O-1"));
    }

    #[tokio::test]
    async fn count_waits_for_the_fetch_already_in_flight() {
        let rest = Arc::new(MockRest::new());
        let gate = rest.gate(RestMethod::Read, service::MONOLITH, nouns::REMINDER_COUNT);
        rest.respond(
            RestMethod::Read,
            service::MONOLITH,
            nouns::REMINDER_COUNT,
            Envelope::ok(json!({ "count": 6 })),
        );
        let desk = DeskContext::with_rest(DeskConfig::default(), rest.clone());

        let in_flight = tokio::spawn({
            let notifier = desk.reminders().clone();
            async move { notifier.fetch_count().await }
        });
        while rest.call_count(RestMethod::Read, nouns::REMINDER_COUNT) == 0 {
            tokio::task::yield_now().await;
        }

        let (count, ()) = tokio::join!(current_count(&desk), async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            gate.open();
        });

        assert_eq!(count.unwrap(), 6);
        assert_eq!(in_flight.await.unwrap(), FetchOutcome::Fetched(6));
        assert_eq!(rest.call_count(RestMethod::Read, nouns::REMINDER_COUNT), 1);
    }
}
