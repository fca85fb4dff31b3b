//! # Order Lifecycle Controller
//!
//! The only writer of order state. Every intake channel and every status
//! button on a display ends up here.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_order / create_external_order                                  │
//! │      │                                                                  │
//! │      ├── validate ── price (kaori-core) ── next_order_number           │
//! │      ├── OrderRepository::append                                       │
//! │      └── EventSink::publish(new_order)                                 │
//! │                                                                         │
//! │  confirm / update_status / cancel                                      │
//! │      │                                                                  │
//! │      ├── read current status ── check TransitionPolicy                 │
//! │      ├── compare_and_set_status (retry if another writer got there)    │
//! │      └── EventSink::publish(order_status)   only if status changed     │
//! │                                                                         │
//! │  record_payment                                                        │
//! │      ├── check amount ── mark_paid                                     │
//! │      └── EventSink::publish(payment)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transition Policies
//! ```text
//! Strict (default)                     Permissive
//! ─────────────────────────────────    ─────────────────────────────────
//! pending → confirmed → cooking →      any status → any declared status
//!   ready → completed, one step        cancel always succeeds
//! cancelled from non-terminal only
//! ```
//! `confirm` is only valid from `pending` under both policies. Setting the
//! status an order already has is a successful no-op and emits nothing.
//!
//! Each store write and its publish happen under one `publish_lock`, so
//! subscribers see events in commit order even when writers race.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use kaori_core::pricing::{price_external_lines, price_lines};
use kaori_core::validation::{
    validate_notes, validate_required, validate_store_id, validate_tendered_amount,
};
use kaori_core::{
    FulfillmentType, Order, OrderEvent, OrderSource, OrderStatus, PaymentMethod, PaymentStatus,
    PaymentUpdate, PricedOrder, PricingPolicy, StaffRole, StatusChange, ValidationError,
};

use crate::error::{OrderError, OrderResult};
use crate::intake::{NewExternalOrder, NewOrder, PaymentReceipt, PaymentRequest};
use crate::repository::{CatalogReader, EventSink, OrderRepository, PaymentWrite, StatusWrite};

// =============================================================================
// Policy
// =============================================================================

/// How `update_status` and `cancel` treat out-of-order requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Only the next forward step, or cancel from a non-terminal state.
    #[default]
    Strict,
    /// Any declared status is accepted from any state.
    Permissive,
}

/// Knobs the lifecycle is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecyclePolicy {
    pub transitions: TransitionPolicy,
    pub pricing: PricingPolicy,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Confirm,
    Update,
    Cancel,
}

// =============================================================================
// Controller
// =============================================================================

/// Validates and applies every change to order state.
#[derive(Clone)]
pub struct OrderLifecycle {
    store: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogReader>,
    events: Arc<dyn EventSink>,
    /// Held from a store write until its event is published.
    publish_lock: Arc<Mutex<()>>,
    policy: LifecyclePolicy,
}

impl OrderLifecycle {
    pub fn new(
        store: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogReader>,
        events: Arc<dyn EventSink>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            events,
            publish_lock: Arc::new(Mutex::new(())),
            policy,
        }
    }

    pub fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Prices and records an order built from catalog lines.
    ///
    /// Counter orders start `confirmed`; every other channel starts `pending`.
    pub fn create_order(&self, req: NewOrder) -> OrderResult<Order> {
        validate_store_id(&req.store_id)?;
        validate_notes(req.notes.as_deref())?;
        if req.source == OrderSource::TableQr {
            validate_required("table_id", req.table_id.as_deref().unwrap_or_default())?;
        }

        let catalog = self.catalog.snapshot();
        let priced = price_lines(&catalog, &req.lines, self.policy.pricing)?;
        let table_number = req
            .table_id
            .as_deref()
            .and_then(|id| catalog.table(id))
            .map(|t| t.number);

        let now = Utc::now();
        let order = self.build_order(
            req.store_id,
            req.source,
            req.order_type,
            req.source.initial_status(),
            PaymentStatus::Unpaid,
            priced,
            now,
        );
        let order = Order {
            notes: req.notes,
            table_id: req.table_id,
            table_number,
            cashier: req.cashier,
            ..order
        };

        Ok(self.commit_new(order))
    }

    /// Records an order a delivery platform already priced and collected.
    ///
    /// Totals are recomputed from the lines; the platform's own total is kept
    /// in `delivery.platform_total` for reconciliation.
    pub fn create_external_order(&self, req: NewExternalOrder) -> OrderResult<Order> {
        validate_store_id(&req.store_id)?;
        validate_notes(req.notes.as_deref())?;
        validate_required("external_order_id", &req.delivery.external_order_id)?;
        if !req.source.is_delivery() {
            return Err(ValidationError::NotAllowed {
                field: "source".to_string(),
                allowed: [
                    OrderSource::GrabFood,
                    OrderSource::GoFood,
                    OrderSource::ShopeeFood,
                    OrderSource::Delivery,
                ]
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            }
            .into());
        }

        let priced = price_external_lines(&req.lines)?;
        if let Some(reported) = req.delivery.platform_total {
            if reported != priced.total.rupiah() && reported != priced.subtotal.rupiah() {
                warn!(
                    external_order_id = %req.delivery.external_order_id,
                    reported,
                    computed = priced.total.rupiah(),
                    "Platform total differs from computed total"
                );
            }
        }

        let order = self.build_order(
            req.store_id,
            req.source,
            FulfillmentType::Delivery,
            OrderStatus::Pending,
            PaymentStatus::Paid,
            priced,
            Utc::now(),
        );
        let order = Order {
            notes: req.notes,
            delivery: Some(req.delivery),
            ..order
        };

        Ok(self.commit_new(order))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_order(
        &self,
        store_id: String,
        source: OrderSource,
        order_type: FulfillmentType,
        status: OrderStatus,
        payment_status: PaymentStatus,
        priced: PricedOrder,
        now: chrono::DateTime<Utc>,
    ) -> Order {
        Order {
            id: Uuid::new_v4().to_string(),
            store_id,
            order_number: self.store.next_order_number(source),
            order_source: source,
            order_type,
            status,
            payment_status,
            items: priced.items,
            subtotal: priced.subtotal.rupiah(),
            tax: priced.tax.rupiah(),
            total: priced.total.rupiah(),
            notes: None,
            table_id: None,
            table_number: None,
            delivery: None,
            cashier: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn commit_new(&self, order: Order) -> Order {
        let _ordered = self.publish_lock.lock();
        self.store.append(order.clone());
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            source = %order.order_source,
            status = %order.status,
            total = order.total,
            "Order created"
        );
        self.events
            .publish(&order.store_id, OrderEvent::NewOrder(order.clone()));
        order
    }

    // -------------------------------------------------------------------------
    // Status transitions
    // -------------------------------------------------------------------------

    /// Role check applied before `confirm`.
    pub fn authorize_confirm(role: StaffRole) -> OrderResult<()> {
        if role.can_confirm() {
            Ok(())
        } else {
            Err(OrderError::Forbidden {
                role,
                action: "confirm orders",
            })
        }
    }

    /// Accepts a pending order into the kitchen queue.
    pub fn confirm(&self, id: &str, actor: StaffRole) -> OrderResult<Order> {
        Self::authorize_confirm(actor)?;
        self.transition(id, OrderStatus::Confirmed, Action::Confirm)
    }

    /// Moves an order to `status`, subject to the transition policy.
    pub fn update_status(&self, id: &str, status: OrderStatus) -> OrderResult<Order> {
        self.transition(id, status, Action::Update)
    }

    pub fn cancel(&self, id: &str) -> OrderResult<Order> {
        self.transition(id, OrderStatus::Cancelled, Action::Cancel)
    }

    fn transition(&self, id: &str, to: OrderStatus, action: Action) -> OrderResult<Order> {
        loop {
            let current = self
                .store
                .by_id(id)
                .ok_or_else(|| OrderError::not_found(id))?;
            let from = current.status;

            self.check_transition(id, from, to, action)?;
            if from == to {
                debug!(order_id = %id, status = %to, "Status unchanged");
                return Ok(current);
            }

            let _ordered = self.publish_lock.lock();
            match self.store.compare_and_set_status(id, from, to) {
                StatusWrite::Applied(order) => {
                    info!(order_id = %id, from = %from, to = %to, "Order status changed");
                    self.events.publish(
                        &order.store_id,
                        OrderEvent::OrderStatus(StatusChange {
                            id: order.id.clone(),
                            status: to,
                        }),
                    );
                    return Ok(order);
                }
                StatusWrite::Stale(actual) => {
                    debug!(order_id = %id, expected = %from, actual = %actual, "Concurrent status change, retrying");
                }
                StatusWrite::NotFound => return Err(OrderError::not_found(id)),
            }
        }
    }

    fn check_transition(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
        action: Action,
    ) -> OrderResult<()> {
        let allowed = match (action, self.policy.transitions) {
            (Action::Confirm, _) => from == OrderStatus::Pending,
            (_, TransitionPolicy::Permissive) => true,
            (_, TransitionPolicy::Strict) => from == to || from.can_transition_to(to),
        };
        if allowed {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                id: id.to_string(),
                from,
                to,
            })
        }
    }

    // -------------------------------------------------------------------------
    // Payment
    // -------------------------------------------------------------------------

    /// Settles an order.
    ///
    /// Cash must cover the total and change is returned; gateway-confirmed
    /// methods must match the total exactly.
    pub fn record_payment(&self, req: PaymentRequest) -> OrderResult<PaymentReceipt> {
        validate_tendered_amount(req.amount)?;

        let order = self
            .store
            .by_id(&req.order_id)
            .ok_or_else(|| OrderError::not_found(&req.order_id))?;
        if order.is_paid() {
            return Err(OrderError::AlreadyPaid(order.id));
        }

        let change = match req.method {
            PaymentMethod::Cash if req.amount < order.total => {
                return Err(OrderError::InsufficientPayment {
                    total: order.total,
                    tendered: req.amount,
                });
            }
            PaymentMethod::Cash => req.amount - order.total,
            _ if req.amount != order.total => {
                return Err(OrderError::AmountMismatch {
                    expected: order.total,
                    received: req.amount,
                });
            }
            _ => 0,
        };

        let _ordered = self.publish_lock.lock();
        let order = match self.store.mark_paid(&req.order_id) {
            PaymentWrite::Paid(order) => order,
            PaymentWrite::AlreadyPaid => return Err(OrderError::AlreadyPaid(req.order_id)),
            PaymentWrite::NotFound => return Err(OrderError::not_found(&req.order_id)),
        };

        info!(
            order_id = %order.id,
            method = ?req.method,
            total = order.total,
            change,
            "Payment recorded"
        );
        self.events.publish(
            &order.store_id,
            OrderEvent::Payment(PaymentUpdate {
                id: order.id.clone(),
                payment_status: order.payment_status,
                method: req.method,
                total: order.total,
            }),
        );

        Ok(PaymentReceipt {
            order_id: order.id,
            order_number: order.order_number,
            method: req.method,
            total: order.total,
            amount_paid: req.amount,
            change,
        })
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn get(&self, id: &str) -> OrderResult<Order> {
        self.store.by_id(id).ok_or_else(|| OrderError::not_found(id))
    }

    pub fn all(&self) -> Vec<Order> {
        self.store.all()
    }

    /// Orders on the kitchen board (confirmed, cooking, ready).
    pub fn active(&self) -> Vec<Order> {
        self.store.by_status(&OrderStatus::ACTIVE)
    }

    /// Orders waiting for a cashier to confirm them.
    pub fn incoming(&self) -> Vec<Order> {
        self.store.by_status(&[OrderStatus::Pending])
    }

    pub fn by_source(&self, source: OrderSource) -> Vec<Order> {
        self.store.by_source(source)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::store::OrderStore;
    use kaori_core::{Catalog, DeliveryInfo, ExternalLine, LineRequest, Product, Table};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(String, OrderEvent)>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<(String, OrderEvent)> {
            std::mem::take(&mut *self.events.lock())
        }
    }

    impl EventSink for RecordingSink {
        fn publish(&self, store_id: &str, event: OrderEvent) {
            self.events.lock().push((store_id.to_string(), event));
        }
    }

    fn product(id: &str, name: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            category_id: "cat-1".to_string(),
            name: name.to_string(),
            description: String::new(),
            base_price: price,
            is_available: true,
            variants: vec![],
            modifiers: vec![],
        }
    }

    struct Fixture {
        store: Arc<OrderStore>,
        sink: Arc<RecordingSink>,
        lifecycle: OrderLifecycle,
    }

    fn fixture(transitions: TransitionPolicy) -> Fixture {
        let catalog = Catalog::new(
            vec![
                product("prod-1", "Espresso", 18_000),
                product("prod-3", "Cappuccino", 28_000),
            ],
            vec![Table {
                id: "table-4".to_string(),
                number: 4,
                capacity: 6,
                qr_code: "QR004".to_string(),
            }],
        );
        let store = Arc::new(OrderStore::new());
        let sink = Arc::new(RecordingSink::default());
        let lifecycle = OrderLifecycle::new(
            store.clone(),
            Arc::new(InMemoryCatalog::new(catalog)),
            sink.clone(),
            LifecyclePolicy {
                transitions,
                pricing: PricingPolicy::Permissive,
            },
        );
        Fixture {
            store,
            sink,
            lifecycle,
        }
    }

    fn counter_order() -> NewOrder {
        NewOrder {
            store_id: "store-1".to_string(),
            source: OrderSource::Cashier,
            order_type: FulfillmentType::Takeaway,
            table_id: None,
            lines: vec![LineRequest::new("prod-1", 1), LineRequest::new("prod-3", 1)],
            notes: None,
            cashier: None,
        }
    }

    fn grab_order() -> NewExternalOrder {
        NewExternalOrder {
            store_id: "store-1".to_string(),
            source: OrderSource::GrabFood,
            lines: vec![ExternalLine {
                name: "Latte".to_string(),
                quantity: 2,
                price: 28_000,
                notes: None,
            }],
            delivery: DeliveryInfo {
                external_order_id: "GF-7781".to_string(),
                customer_name: Some("Budi".to_string()),
                platform_total: Some(56_000),
                ..DeliveryInfo::default()
            },
            notes: None,
        }
    }

    #[test]
    fn test_counter_order_end_to_end() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f.lifecycle.create_order(counter_order()).unwrap();

        assert_eq!(order.order_number, "ORD-1001");
        assert_eq!(order.subtotal, 46_000);
        assert_eq!(order.tax, 5_060);
        assert_eq!(order.total, 51_060);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);

        let events = f.sink.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "store-1");
        assert_eq!(events[0].1, OrderEvent::NewOrder(order.clone()));
        assert_eq!(f.store.by_id(&order.id), Some(order));
    }

    #[test]
    fn test_table_order_starts_pending() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f
            .lifecycle
            .create_order(NewOrder {
                source: OrderSource::TableQr,
                order_type: FulfillmentType::DineIn,
                table_id: Some("table-4".to_string()),
                ..counter_order()
            })
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.table_number, Some(4));
        assert_eq!(order.total, 51_060);
        assert_eq!(f.lifecycle.incoming().len(), 1);
    }

    #[test]
    fn test_table_order_requires_table() {
        let f = fixture(TransitionPolicy::Strict);
        let err = f
            .lifecycle
            .create_order(NewOrder {
                source: OrderSource::TableQr,
                ..counter_order()
            })
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn test_rejected_order_leaves_no_trace() {
        let f = fixture(TransitionPolicy::Strict);
        let err = f
            .lifecycle
            .create_order(NewOrder {
                lines: vec![],
                ..counter_order()
            })
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
        assert!(f.store.is_empty());
        assert!(f.sink.take().is_empty());

        // sequence not consumed by the failed attempt
        let order = f.lifecycle.create_order(counter_order()).unwrap();
        assert_eq!(order.order_number, "ORD-1001");
    }

    #[test]
    fn test_unknown_order_is_not_found() {
        let f = fixture(TransitionPolicy::Strict);
        f.lifecycle.create_order(counter_order()).unwrap();
        f.sink.take();
        let before = f.store.all();

        let err = f.lifecycle.update_status("missing", OrderStatus::Confirmed).unwrap_err();
        assert!(matches!(err, OrderError::NotFound(id) if id == "missing"));
        assert!(matches!(
            f.lifecycle.cancel("missing"),
            Err(OrderError::NotFound(_))
        ));
        assert!(matches!(
            f.lifecycle.confirm("missing", StaffRole::Cashier),
            Err(OrderError::NotFound(_))
        ));

        assert_eq!(f.store.all(), before);
        assert!(f.sink.take().is_empty());
    }

    #[test]
    fn test_strict_walks_forward_one_step_at_a_time() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f.lifecycle.create_order(counter_order()).unwrap();
        f.sink.take();

        let err = f
            .lifecycle
            .update_status(&order.id, OrderStatus::Completed)
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Completed,
                ..
            }
        ));
        assert!(f.sink.take().is_empty());

        for next in [OrderStatus::Cooking, OrderStatus::Ready, OrderStatus::Completed] {
            let updated = f.lifecycle.update_status(&order.id, next).unwrap();
            assert_eq!(updated.status, next);
            assert!(updated.updated_at >= order.updated_at);

            let events = f.sink.take();
            assert_eq!(
                events,
                vec![(
                    "store-1".to_string(),
                    OrderEvent::OrderStatus(StatusChange {
                        id: order.id.clone(),
                        status: next,
                    })
                )]
            );
        }

        assert!(matches!(
            f.lifecycle.cancel(&order.id),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_same_status_is_silent_noop() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f.lifecycle.create_order(counter_order()).unwrap();
        f.sink.take();

        let same = f
            .lifecycle
            .update_status(&order.id, OrderStatus::Confirmed)
            .unwrap();
        assert_eq!(same.updated_at, order.updated_at);
        assert!(f.sink.take().is_empty());
    }

    #[test]
    fn test_permissive_accepts_any_jump() {
        let f = fixture(TransitionPolicy::Permissive);
        let order = f.lifecycle.create_order(counter_order()).unwrap();

        let done = f
            .lifecycle
            .update_status(&order.id, OrderStatus::Completed)
            .unwrap();
        assert_eq!(done.status, OrderStatus::Completed);

        let cancelled = f.lifecycle.cancel(&order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let back = f
            .lifecycle
            .update_status(&order.id, OrderStatus::Pending)
            .unwrap();
        assert_eq!(back.status, OrderStatus::Pending);
    }

    #[test]
    fn test_confirm_rules() {
        let f = fixture(TransitionPolicy::Strict);
        let pending = f
            .lifecycle
            .create_order(NewOrder {
                source: OrderSource::ClientApp,
                ..counter_order()
            })
            .unwrap();
        f.sink.take();

        assert!(matches!(
            f.lifecycle.confirm(&pending.id, StaffRole::Kitchen),
            Err(OrderError::Forbidden { role: StaffRole::Kitchen, .. })
        ));
        assert_eq!(f.store.by_id(&pending.id).unwrap().status, OrderStatus::Pending);

        let confirmed = f.lifecycle.confirm(&pending.id, StaffRole::Cashier).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(f.sink.take().len(), 1);

        // only from pending
        assert!(matches!(
            f.lifecycle.confirm(&pending.id, StaffRole::StoreAdmin),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_emits_status_event() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f.lifecycle.create_order(counter_order()).unwrap();
        f.sink.take();

        let cancelled = f.lifecycle.cancel(&order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        let events = f.sink.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.kind(), "order_status");

        // cancelling twice is a no-op, not an error
        assert!(f.lifecycle.cancel(&order.id).is_ok());
        assert!(f.sink.take().is_empty());
    }

    #[test]
    fn test_external_order() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f.lifecycle.create_external_order(grab_order()).unwrap();

        assert!(order.order_number.starts_with("GRAB-"));
        assert_eq!(order.order_type, FulfillmentType::Delivery);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.subtotal, 56_000);
        assert_eq!(order.tax, 6_160);
        assert_eq!(order.total, order.subtotal + order.tax);
        assert_eq!(
            order.delivery.as_ref().map(|d| d.external_order_id.as_str()),
            Some("GF-7781")
        );
        assert_eq!(f.lifecycle.by_source(OrderSource::GrabFood).len(), 1);
        assert_eq!(f.sink.take().len(), 1);
    }

    #[test]
    fn test_external_order_requires_delivery_source() {
        let f = fixture(TransitionPolicy::Strict);
        let err = f
            .lifecycle
            .create_external_order(NewExternalOrder {
                source: OrderSource::Cashier,
                ..grab_order()
            })
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn test_cash_payment() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f.lifecycle.create_order(counter_order()).unwrap();
        f.sink.take();

        let short = PaymentRequest {
            order_id: order.id.clone(),
            method: PaymentMethod::Cash,
            amount: 50_000,
        };
        assert!(matches!(
            f.lifecycle.record_payment(short),
            Err(OrderError::InsufficientPayment { total: 51_060, tendered: 50_000 })
        ));

        let receipt = f
            .lifecycle
            .record_payment(PaymentRequest {
                order_id: order.id.clone(),
                method: PaymentMethod::Cash,
                amount: 60_000,
            })
            .unwrap();
        assert_eq!(receipt.change, 8_940);
        assert_eq!(receipt.order_number, "ORD-1001");
        assert!(f.store.by_id(&order.id).unwrap().is_paid());

        let events = f.sink.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0].1,
            OrderEvent::Payment(p) if p.payment_status == PaymentStatus::Paid && p.total == 51_060
        ));

        assert!(matches!(
            f.lifecycle.record_payment(PaymentRequest {
                order_id: order.id,
                method: PaymentMethod::Cash,
                amount: 60_000,
            }),
            Err(OrderError::AlreadyPaid(_))
        ));
    }

    #[test]
    fn test_gateway_payment_must_match_total() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f.lifecycle.create_order(counter_order()).unwrap();

        assert!(matches!(
            f.lifecycle.record_payment(PaymentRequest {
                order_id: order.id.clone(),
                method: PaymentMethod::Qris,
                amount: 60_000,
            }),
            Err(OrderError::AmountMismatch { .. })
        ));
        let receipt = f
            .lifecycle
            .record_payment(PaymentRequest {
                order_id: order.id,
                method: PaymentMethod::Qris,
                amount: 51_060,
            })
            .unwrap();
        assert_eq!(receipt.change, 0);
    }

    #[test]
    fn test_concurrent_updates_apply_each_step_once() {
        let f = fixture(TransitionPolicy::Strict);
        let order = f.lifecycle.create_order(counter_order()).unwrap();
        f.sink.take();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lifecycle = f.lifecycle.clone();
                let id = order.id.clone();
                std::thread::spawn(move || lifecycle.update_status(&id, OrderStatus::Cooking).is_ok())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }

        // one writer changed the status, the rest saw it already cooking
        assert_eq!(f.sink.take().len(), 1);
    }

    /// Sink that stalls while publishing one chosen status.
    struct StallingSink {
        stall_on: OrderStatus,
        events: Mutex<Vec<OrderStatus>>,
    }

    impl EventSink for StallingSink {
        fn publish(&self, _store_id: &str, event: OrderEvent) {
            if let OrderEvent::OrderStatus(change) = event {
                if change.status == self.stall_on {
                    std::thread::sleep(std::time::Duration::from_millis(200));
                }
                self.events.lock().push(change.status);
            }
        }
    }

    #[test]
    fn test_events_follow_commit_order_under_slow_sink() {
        let store = Arc::new(OrderStore::new());
        let sink = Arc::new(StallingSink {
            stall_on: OrderStatus::Cooking,
            events: Mutex::new(Vec::new()),
        });
        let lifecycle = OrderLifecycle::new(
            store.clone(),
            Arc::new(InMemoryCatalog::new(Catalog::new(
                vec![product("prod-1", "Espresso", 18_000)],
                vec![],
            ))),
            sink.clone(),
            LifecyclePolicy::default(),
        );
        let order = lifecycle
            .create_order(NewOrder {
                lines: vec![LineRequest::new("prod-1", 1)],
                ..counter_order()
            })
            .unwrap();

        let cooking = {
            let lifecycle = lifecycle.clone();
            let id = order.id.clone();
            std::thread::spawn(move || lifecycle.update_status(&id, OrderStatus::Cooking))
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        lifecycle.update_status(&order.id, OrderStatus::Ready).unwrap();
        cooking.join().unwrap().unwrap();

        assert_eq!(store.by_id(&order.id).unwrap().status, OrderStatus::Ready);
        assert_eq!(
            *sink.events.lock(),
            vec![OrderStatus::Cooking, OrderStatus::Ready]
        );
    }
}
