//! End-to-end tests of the allocation and return flows against PostgreSQL.
//!
//! All tests are `#[ignore]`d by default; set `TEST_DATABASE_URL` and run
//! `cargo test -- --ignored` to execute them.

mod common;

use uuid::Uuid;

use common::*;
use domain::models::allocation::{
    AllocateRequest, AllocationTarget, RegisterReturnRequest, ReturnOutcome, ShipmentMode,
};
use domain::models::material::AdjustQuantityRequest;
use domain::models::serial::SerialStatus;
use domain::InventoryError;

fn with_crew(
    event_id: Uuid,
    line_id: Uuid,
    material_id: Uuid,
    target: AllocationTarget,
    responsible: &str,
) -> AllocateRequest {
    AllocateRequest {
        event_id,
        event_name: Some("Festival de Verão".to_string()),
        checklist_line_id: line_id,
        material_id,
        target,
        shipment_mode: ShipmentMode::WithCrew,
        carrier_name: None,
        crew_member: Some(responsible.to_string()),
    }
}

fn return_request(outcome: ReturnOutcome, notes: &str) -> RegisterReturnRequest {
    RegisterReturnRequest {
        outcome,
        notes: notes.to_string(),
        proof_refs: vec![],
        returned_quantity: None,
    }
}

#[tokio::test]
#[ignore]
async fn serialized_allocation_and_damaged_return() {
    let (engine, pool) = setup_engine().await;
    let event_id = Uuid::new_v4();

    let material =
        create_serialized_material(&engine, &unique_name("Refletor"), &["SN-001", "SN-002"]).await;
    let line = create_checklist_line(&pool, event_id, material.id, 2).await;

    // Allocate SN-001 with Ana responsible.
    let allocation = engine
        .allocations
        .allocate(with_crew(
            event_id,
            line.id,
            material.id,
            AllocationTarget::Serial {
                serial_number: "SN-001".to_string(),
            },
            "Ana",
        ))
        .await
        .expect("allocation should succeed");

    let serials = engine.queries.serials_for_allocation(material.id).await.unwrap();
    let sn1 = serials.iter().find(|s| s.serial_number == "SN-001").unwrap();
    assert_eq!(sn1.status, SerialStatus::InUse);
    assert_eq!(sn1.event_id, Some(event_id));

    // A second reservation of the same unit must fail.
    let second = engine
        .allocations
        .allocate(with_crew(
            Uuid::new_v4(),
            line.id,
            material.id,
            AllocationTarget::Serial {
                serial_number: "SN-001".to_string(),
            },
            "Bruno",
        ))
        .await;
    assert!(matches!(
        second,
        Err(InventoryError::SerialUnavailable { .. })
    ));

    // Damaged return parks the unit in maintenance and clears the link.
    engine
        .returns
        .register_return(
            allocation.id,
            return_request(ReturnOutcome::ReturnedDamaged, "lens cracked"),
        )
        .await
        .expect("return should succeed");

    let serials = engine.queries.serials_for_allocation(material.id).await.unwrap();
    let sn1 = serials.iter().find(|s| s.serial_number == "SN-001").unwrap();
    assert_eq!(sn1.status, SerialStatus::Maintenance);
    assert!(sn1.event_id.is_none());
}

#[tokio::test]
#[ignore]
async fn quantity_shortfall_is_implicitly_consumed() {
    let (engine, pool) = setup_engine().await;
    let event_id = Uuid::new_v4();

    // Cadeiras: total=50, available=50.
    let material = create_quantity_material(&engine, &unique_name("Cadeiras"), 50).await;
    let line = create_checklist_line(&pool, event_id, material.id, 20).await;

    let allocation = engine
        .allocations
        .allocate(with_crew(
            event_id,
            line.id,
            material.id,
            AllocationTarget::Quantity { quantity: 20 },
            "Ana",
        ))
        .await
        .unwrap();

    let summary = engine.queries.material_summary(material.id).await.unwrap();
    assert_eq!(summary.available, 30);
    assert_eq!(summary.total, 50);
    assert_eq!(summary.reserved, 20);

    // 15 come back, 5 unaccounted: available=45, total=45.
    engine
        .returns
        .register_return(
            allocation.id,
            RegisterReturnRequest {
                outcome: ReturnOutcome::ReturnedOk,
                notes: String::new(),
                proof_refs: vec![],
                returned_quantity: Some(15),
            },
        )
        .await
        .unwrap();

    let summary = engine.queries.material_summary(material.id).await.unwrap();
    assert_eq!(summary.available, 45);
    assert_eq!(summary.total, 45);
    assert_eq!(summary.reserved, 0);
}

#[tokio::test]
#[ignore]
async fn concurrent_allocation_of_same_serial_yields_one_winner() {
    let (engine, pool) = setup_engine().await;
    let event_id = Uuid::new_v4();

    let material =
        create_serialized_material(&engine, &unique_name("Mesa de Som"), &["SN-100"]).await;
    let line = create_checklist_line(&pool, event_id, material.id, 1).await;

    let request_a = with_crew(
        event_id,
        line.id,
        material.id,
        AllocationTarget::Serial {
            serial_number: "SN-100".to_string(),
        },
        "Ana",
    );
    let mut request_b = request_a.clone();
    request_b.crew_member = Some("Bruno".to_string());

    let engine_a = engine.clone();
    let engine_b = engine.clone();
    let (first, second) = tokio::join!(
        engine_a.allocations.allocate(request_a),
        engine_b.allocations.allocate(request_b),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one caller may win the serial");

    let failure = if first.is_err() { first } else { second };
    assert!(matches!(
        failure,
        Err(InventoryError::SerialUnavailable { .. })
    ));
}

#[tokio::test]
#[ignore]
async fn second_return_fails_and_leaves_counters_alone() {
    let (engine, pool) = setup_engine().await;
    let event_id = Uuid::new_v4();

    let material = create_quantity_material(&engine, &unique_name("Cabos"), 30).await;
    let line = create_checklist_line(&pool, event_id, material.id, 10).await;

    let allocation = engine
        .allocations
        .allocate(with_crew(
            event_id,
            line.id,
            material.id,
            AllocationTarget::Quantity { quantity: 10 },
            "Ana",
        ))
        .await
        .unwrap();

    engine
        .returns
        .register_return(allocation.id, return_request(ReturnOutcome::ReturnedOk, ""))
        .await
        .unwrap();

    let result = engine
        .returns
        .register_return(allocation.id, return_request(ReturnOutcome::ReturnedOk, ""))
        .await;
    assert!(matches!(result, Err(InventoryError::AlreadyReturned { .. })));

    // Counters reflect only the first call.
    let summary = engine.queries.material_summary(material.id).await.unwrap();
    assert_eq!(summary.available, 30);
    assert_eq!(summary.total, 30);
}

#[tokio::test]
#[ignore]
async fn batch_return_isolates_per_item_failures() {
    let (engine, pool) = setup_engine().await;
    let event_id = Uuid::new_v4();

    let material = create_serialized_material(
        &engine,
        &unique_name("Par LED"),
        &["SN-201", "SN-202", "SN-203"],
    )
    .await;
    let line = create_checklist_line(&pool, event_id, material.id, 3).await;

    let mut allocation_ids = Vec::new();
    for number in ["SN-201", "SN-202", "SN-203"] {
        let allocation = engine
            .allocations
            .allocate(with_crew(
                event_id,
                line.id,
                material.id,
                AllocationTarget::Serial {
                    serial_number: number.to_string(),
                },
                "Ana",
            ))
            .await
            .unwrap();
        allocation_ids.push(allocation.id);
    }

    // Pre-return the middle one so the batch hits a terminal allocation.
    engine
        .returns
        .register_return(
            allocation_ids[1],
            return_request(ReturnOutcome::ReturnedOk, ""),
        )
        .await
        .unwrap();

    let items = engine
        .returns
        .register_return_batch(&allocation_ids, ReturnOutcome::ReturnedOk, "", &[])
        .await;

    assert_eq!(items.len(), 3);
    assert!(items[0].is_success());
    assert!(matches!(
        items[1].result,
        Err(InventoryError::AlreadyReturned { .. })
    ));
    assert!(items[2].is_success());

    // The two successes' effects are committed regardless.
    let serials = engine.queries.serials_for_allocation(material.id).await.unwrap();
    assert!(serials
        .iter()
        .all(|s| s.status == SerialStatus::Available && s.event_id.is_none()));
}

#[tokio::test]
#[ignore]
async fn deallocate_restores_stock_and_checklist() {
    let (engine, pool) = setup_engine().await;
    let event_id = Uuid::new_v4();

    let material = create_quantity_material(&engine, &unique_name("Praticáveis"), 12).await;
    let line = create_checklist_line(&pool, event_id, material.id, 8).await;

    let allocation = engine
        .allocations
        .allocate(with_crew(
            event_id,
            line.id,
            material.id,
            AllocationTarget::Quantity { quantity: 8 },
            "Ana",
        ))
        .await
        .unwrap();

    engine.allocations.deallocate(allocation.id).await.unwrap();

    let summary = engine.queries.material_summary(material.id).await.unwrap();
    assert_eq!(summary.available, 12);
    assert_eq!(summary.reserved, 0);

    let progress = engine.queries.checklist_progress(event_id).await.unwrap();
    assert_eq!(progress[0].allocated, 0);

    // Nothing left to return for this event.
    let pending = engine.queries.pending_returns(event_id).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
#[ignore]
async fn adjust_quantity_guards_negative_stock() {
    let (engine, _pool) = setup_engine().await;

    let material = create_quantity_material(&engine, &unique_name("Lonas"), 5).await;

    let result = engine
        .catalog
        .adjust_quantity(
            material.id,
            AdjustQuantityRequest {
                delta: -6,
                reason: "descarte".to_string(),
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(InventoryError::NegativeStockViolation { .. })
    ));

    // A legal exit works and lands on the ledger.
    engine
        .catalog
        .adjust_quantity(
            material.id,
            AdjustQuantityRequest {
                delta: -2,
                reason: "avaria no transporte".to_string(),
            },
        )
        .await
        .unwrap();

    let page = engine
        .queries
        .movement_history(material.id, None, None, None)
        .await
        .unwrap();
    assert!(!page.entries.is_empty());
    // Newest first: the exit precedes the initial stock entry.
    assert_eq!(
        page.entries[0].operation,
        domain::models::ledger::MovementKind::StockExit
    );
}

#[tokio::test]
#[ignore]
async fn duplicate_serial_number_is_rejected() {
    let (engine, _pool) = setup_engine().await;

    let material =
        create_serialized_material(&engine, &unique_name("Moving Head"), &["SN-301"]).await;

    let result = engine
        .catalog
        .create_serial(
            material.id,
            domain::models::serial::CreateSerialRequest {
                serial_number: "SN-301".to_string(),
                location: None,
                tags: vec![],
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(InventoryError::DuplicateSerialNumber { .. })
    ));
}
