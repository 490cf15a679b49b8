use super::*;

#[tokio::test]
async fn every_operation_is_unsupported() {
    let backend = WasmBackend::new();
    let spec = ComponentSpec::new("comp", "wasm-module.wasm");

    assert!(matches!(backend.install(&spec).await, Err(RuntimeError::Unsupported(_))));
    assert!(matches!(backend.start(&spec).await, Err(RuntimeError::Unsupported(_))));
    assert!(matches!(backend.stop("comp").await, Err(RuntimeError::Unsupported(_))));
    assert!(matches!(backend.delete("comp").await, Err(RuntimeError::Unsupported(_))));
    assert!(matches!(backend.status("comp").await, Err(RuntimeError::Unsupported(_))));
}

#[test]
fn name_and_capabilities() {
    let backend = WasmBackend::new();
    assert_eq!(backend.name(), "wasm");
    assert!(backend.capabilities().is_empty());
}
