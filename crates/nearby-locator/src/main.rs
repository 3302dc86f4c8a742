#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use nearby_locator::NearbyLocatorApp;

fn main() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    // The spawned acquisition/fetch/route tasks need the runtime context that
    // block_on keeps entered on the UI thread.
    rt.block_on(async {
        nearby_locator::run::native_main("Nearby Locator", |cc| {
            Box::new(NearbyLocatorApp::new(cc))
        })
        .await;
    });
}
