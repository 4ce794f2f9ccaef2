//! # Secure Chat Demo
//!
//! Alice and Bob register with one certificate authority, run a SIGMA
//! handshake step by step, and exchange an encrypted message.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example secure_chat_demo
//! ```

use sigmachat_core::{establish_secure_chat, CertificateAuthority, Client};

fn main() -> sigmachat_core::Result<()> {
    println!("=== SigmaChat Core: Secure Chat Demo ===\n");

    // Step 1: One trust domain, two clients
    println!("Step 1: Registering Alice and Bob with the certificate authority...");

    let ca = CertificateAuthority::new();
    let alice = Client::new("alice").register(Some(&ca))?;
    let bob = Client::new("bob").register(Some(&ca))?;

    println!("  CA key: {}...", hex::encode(&ca.public_key()[..8]));
    println!("  {}", alice.certificate());
    println!("  {}", bob.certificate());
    println!();

    // Step 2: The four handshake messages, one at a time
    println!("Step 2: Running the SIGMA handshake...");

    let mut initiator = alice.as_initiator();
    let mut challenger = bob.as_challenger();

    let commitment = initiator.initiate()?;
    println!("  alice -> bob   g^x        ({} bytes)", commitment.len());

    let challenge = challenger.challenge(&commitment)?;
    println!("  bob   -> alice challenge  ({} bytes)", challenge.len());

    let response = initiator.respond(&challenge)?;
    println!("  alice -> bob   response   ({} bytes)", response.len());

    challenger.finalise(&response)?;
    println!("  initiator: {}, challenger: {}", initiator.state(), challenger.state());

    let alice_key = initiator.session_key()?;
    let bob_key = challenger.session_key()?;
    println!("  Session keys match: {}", alice_key == bob_key);
    println!();

    // Step 3: Chat
    println!("Step 3: Exchanging encrypted messages over a fresh session...");

    let (alice_chat, bob_chat) =
        establish_secure_chat(&mut alice.as_initiator(), &mut bob.as_challenger())?;
    println!("  Fresh session key differs from the first: {}", *alice_chat.session_key() != alice_key);

    let wire = alice_chat.send_message("Hey Bob!")?;
    println!("  Ciphertext envelope: {} bytes", wire.len());
    println!("  {}", bob_chat.receive_message(&wire)?);

    let wire = bob_chat.send_message("Hi Alice, this channel is authenticated.")?;
    println!("  {}", alice_chat.receive_message(&wire)?);
    println!();

    println!("=== Demo Complete ===");
    Ok(())
}
