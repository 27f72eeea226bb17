use zfl_core::diagnostic::ErrorCode;
use zfl_parser::{ParseConfig, RawValue, analyze, parse};

const SUBSCRIPTIONS: &str = include_str!("../../../demos/subscriptions.zfl");
const ORDERS: &str = include_str!("../../../demos/orders.zfl");

fn config() -> ParseConfig {
    ParseConfig::new("subscriptions.zfl")
}

#[test]
fn raw_tree_of_subscriptions() {
    let raw = parse(SUBSCRIPTIONS, &config());
    assert!(raw.diagnostics().is_empty(), "{:?}", raw.diagnostics());

    let root = raw.root();
    assert!(root.get("javadoc").is_some_and(RawValue::is_null));
    assert_eq!(root.get_list("imports").len(), 2);

    let flow = root.get_map("flows").get_map("PaymentsFlow");
    assert_eq!(flow.get_str("className"), "PaymentsFlow");
    assert_eq!(flow.get_str("javadoc"), "Subscription renewal, payment and invoicing.");

    let systems: Vec<&str> = flow.get_map("systems").keys().collect();
    assert_eq!(systems, ["Subscription", "Payments", "Billing"]);
    assert_eq!(
        flow.get_map("systems")
            .get_map("Billing")
            .get_map("services")
            .get_map("DefaultService")
            .get_strings("commands"),
        ["generateInvoice"]
    );

    let subscription = flow.get_map("systems").get_map("Subscription");
    assert_eq!(subscription.get_str("zdl"), "subscriptions.zdl");
    assert!(!subscription.get_list("events").is_empty());

    assert_eq!(flow.get_list("whens").len(), 7);
    assert_eq!(flow.get_map("starts").len(), 3);
    assert_eq!(
        flow.get_map("end").get_strings("cancelled"),
        ["RenewalCancelled", "RenewalFailed"]
    );
}

#[test]
fn query_and_locations() {
    let raw = parse(SUBSCRIPTIONS, &config());

    assert_eq!(
        raw.query("$.flows.PaymentsFlow.whens[3].options.if")
            .and_then(RawValue::as_str),
        Some("retries < 3")
    );
    assert_eq!(
        raw.query("flows.PaymentsFlow.starts.CustomerCancelsRenewal.fields.reasons.isArray")
            .and_then(RawValue::as_bool),
        Some(true)
    );

    let command = raw.location("flows.PaymentsFlow.whens[0].command");
    assert_eq!(command.to_string(), "subscriptions.zfl:53:17");

    let start = raw.location("flows.PaymentsFlow.starts.CustomerRequestsSubscriptionRenewal");
    assert_eq!((start.line(), start.column()), (34, 5));

    for path in [
        "flows.PaymentsFlow",
        "flows.PaymentsFlow.name",
        "flows.PaymentsFlow.systems",
        "flows.PaymentsFlow.systems.Billing.options.boundedContext",
        "flows.PaymentsFlow.systems.Payments.services.PaymentsService.commands[2]",
        "flows.PaymentsFlow.whens[5].triggers[1]",
        "flows.PaymentsFlow.end",
        "flows.PaymentsFlow.end.cancelled",
        "imports[1]",
    ] {
        assert!(raw.locations().contains_key(path), "missing location {path}");
    }
}

#[test]
fn semantic_model_of_subscriptions() {
    let model = analyze(&parse(SUBSCRIPTIONS, &config()));
    assert!(model.diagnostics().is_empty(), "{:?}", model.diagnostics());

    let flow = model.flow("PaymentsFlow").expect("flow");
    assert_eq!(flow.starts().len(), 3);
    assert_eq!(flow.commands().len(), 7);
    assert_eq!(flow.events().len(), 11);
    assert_eq!(flow.policies().len(), 7);

    let renewed = flow.event("SubscriptionRenewed").expect("event");
    assert_eq!(renewed.system(), Some("Subscription"));
    assert_eq!(renewed.description(), Some("Subscription extended by one period"));
    assert!(flow.event("RenewalFailed").expect("event").is_error());
    assert!(flow.event("PaymentFailed").expect("event").is_error());

    assert_eq!(
        flow.command("renewSubscription").and_then(|c| c.actor()),
        Some("Customer")
    );
    assert_eq!(flow.command("chargePayment").and_then(|c| c.actor()), None);

    let timer = flow.start("BillingCycleEnded").and_then(|s| s.timer());
    assert_eq!(timer, Some("cron(0 0 * * *)"));

    let conditions: Vec<Option<&str>> = flow.policies().iter().map(|p| p.condition()).collect();
    assert_eq!(conditions.iter().filter(|c| c.is_some()).count(), 2);

    assert!(!model.systems()["Billing"].bounded_context());
    assert!(model.systems()["Payments"].bounded_context());
    assert_eq!(model.actors().len(), 1);
}

#[test]
fn multi_flow_document_with_undeclared_command() {
    let raw = parse(ORDERS, &ParseConfig::new("orders.zfl"));
    assert_eq!(raw.root().get_str("javadoc"), "Checkout and returns of customer orders.");
    let model = analyze(&raw);
    assert_eq!(model.flows().len(), 2);
    assert!(!model.has_errors());

    let warnings: Vec<_> = model
        .diagnostics()
        .iter()
        .filter(|d| d.code() == Some(ErrorCode::E200))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message().contains("refundPayment"));

    let returns = model.flow("Returns").expect("flow");
    assert_eq!(
        returns.command("refundPayment").and_then(|c| c.system()),
        Some("Finance")
    );

    let warehouse = &model.systems()["Warehouse"];
    let services: Vec<&str> = warehouse.services().keys().map(String::as_str).collect();
    assert_eq!(services, ["Fulfillment", "Returns"]);

    let actors: Vec<&str> = model.actors().keys().map(String::as_str).collect();
    assert_eq!(actors, ["Customer", "Clerk"]);
}

#[test]
fn broken_source_still_yields_a_model() {
    let source = "flow Broken {\n  start Go\n  when Go { event Lost }\n  when Go { command act event Done }\n  @\n}\n";
    let model = analyze(&parse(source, &ParseConfig::default()));

    assert!(model.has_errors());
    let flow = model.flow("Broken").expect("flow survives syntax errors");
    assert_eq!(flow.policies().len(), 1);
    assert!(model.diagnostics().iter().all(|d| d.source_ref().is_some()));
    assert_eq!(model.diagnostics()[0].source_ref().map(|r| r.line()), Some(3));
}
