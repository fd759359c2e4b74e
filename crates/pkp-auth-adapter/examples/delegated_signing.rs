/*
[INPUT]:  USER_PRIVATE_KEY and OWNER_PRIVATE_KEY environment variables
[OUTPUT]: A delegated, usage-capped signature over a demo message
[POS]:    Examples - end-to-end delegated signing walkthrough
[UPDATE]: When the engine's public surface changes
*/

use pkp_auth_adapter::*;

/// Example: Delegated signing flow
///
/// This example demonstrates the complete delegated signing flow:
/// 1. Create the auth engine and log the user in
/// 2. Resolve (or mint) the user's PKP
/// 3. Mint a capacity credit owned by the application wallet
/// 4. Sign a message through the delegated, usage-capped channel
#[tokio::main]
async fn main() {
    println!("=== Delegated Signing Example ===\n");

    let (user_key, owner_key) = match (
        std::env::var("USER_PRIVATE_KEY"),
        std::env::var("OWNER_PRIVATE_KEY"),
    ) {
        (Ok(user), Ok(owner)) => (user, owner),
        _ => {
            eprintln!("Set USER_PRIVATE_KEY and OWNER_PRIVATE_KEY to run this example");
            return;
        }
    };

    // Step 1: Create the engine and log in
    let engine = match AuthEngine::new(
        NetworkConfig::default(),
        SessionConfig::default(),
        SignerProvider::new().with_eoa_key(&user_key),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to create engine: {e}");
            return;
        }
    };
    if let Err(e) = engine.login(AccountKind::Eoa) {
        eprintln!("Login failed: {e}");
        return;
    }
    println!("✓ User signer ready");

    // Step 2: Resolve the user's PKP (mints one on first run)
    let pkp = match engine.resolve_pkp(&[]).await {
        Ok(pkp) => pkp,
        Err(e) => {
            eprintln!("PKP resolution failed: {e}");
            return;
        }
    };
    println!("✓ PKP resolved: token {} at {}", pkp.token_id, pkp.eth_address);

    // Step 3: The application wallet owns the capacity credit; the end
    // user never pays for rate limits
    let owner = match EoaSigner::new(&owner_key) {
        Ok(signer) => signer,
        Err(e) => {
            eprintln!("Invalid owner key: {e}");
            return;
        }
    };
    let capacity_token_id = match engine
        .mint_capacity_credits(&RateLimitConfig {
            requests_per_kilosecond: Some(80),
            days_until_utc_midnight_expiration: 2,
            ..Default::default()
        })
        .await
    {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Capacity mint failed: {e}");
            return;
        }
    };
    println!("✓ Capacity credit minted: {capacity_token_id}");

    // Step 4: Sign through the delegated channel (at most 3 uses)
    match engine
        .sign_with_delegation(
            &owner,
            &DelegatedSigningParams {
                message: b"hello from the delegated signing example".to_vec(),
                pkp_info: pkp,
                capacity_token_id,
                max_uses: 3,
            },
        )
        .await
    {
        Ok(signature) => println!("✓ Delegated signature: {signature}"),
        Err(e) => eprintln!("Delegated signing failed: {e}"),
    }
}
