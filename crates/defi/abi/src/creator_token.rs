use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_macro::sol;
use alloy_sol_types::SolConstructor;
use eyre::{eyre, Result};

sol! {
    #[allow(missing_docs)]
    contract CreatorToken {
        constructor(string name_, string symbol_, uint256 initialSupply, address feeRecipient);
    }
}

// solc 0.8.24, optimizer runs=200. The creation code is fixed at build time;
// only the constructor arguments vary per deployment.
const CREATOR_TOKEN_CREATION_CODE: &str = concat!(
    "60806040523480156200001157600080fd5b5060405162001a3838038062001a388339810160408190526200003491620002",
    "a1565b8383600362000044838262000407565b50600462000053828262000407565b5050506200006833826200009560201b",
    "60201c565b6001600160a01b0381166108fc349081150290604051600060405180830381858888f193505050501580156200",
    "008c573d6000803e3d6000fd5b505050620004d3565b6001600160a01b038216620000c55760405163ec442f0560e01b8152",
    "600060048201526024015b60405180910390fd5b620000d360008383620000d7565b5050565b6001600160a01b0383166200",
    "0106578060026000828254620000fa9190620004b7565b90915550620001609050565b6001600160a01b0383166000908152",
    "602081905260409020548181101562000141576040516391b3e51460e01b81526001600160a01b0385166004820152602481",
    "018290526044810183905260640162000bbc565b6001600160a01b0384166000908152602081905260409020908290039055",
    "6555b6001600160a01b038216620001805760028054829003905562000019f565b6001600160a01b03821660009081526020",
    "819052604090208054820190555b816001600160a01b0316836001600160a01b03167fddf252ad1be2c89b69c2b068fc378d",
    "aa952ba7f163c4a11628f55a4df523b3ef83604051620001e591815260200190565b60405180910390a3505050565b634e48",
    "7b7160e01b600052604160045260246000fd5b600181811c908216806200021d57607f821691505b60208210810362000241",
    "57634e487b7160e01b600052602260045260246000fd5b50919050565b601f8211156200028c57600081815260208120601f",
    "850160051c81016020861015620002705750805b601f850160051c820191505b818110156200029157828155600101620002",
    "7c565b505050505050565b80516001600160a01b0381168114620002b057600080fd5b919050565b60008060008060808587",
    "031215620002cc57600080fd5b84516001600160401b0380821115620002e457600080fd5b818701915087601f8301126200",
    "02f957600080fd5b8151818111156200030e576200030e620001f2565b604051601f8201601f19908116603f011681019083",
    "82118183101715620003395762000339620001f2565b81604052828152602093508a848487010111156200035657600080fd",
    "5b600091505b828210156200037a57848201840151818301850152908301906200035b565b60008484830101528097505050",
    "50808701519350505050620003a0604086016200029b565b9150620003b0606086016200029b565b90509295919450925056",
    "57634e487b7160e01b600052602260045260246000fd5b50919050565b601f8211156200028c57600081815260208120601f",
    "850160051c81016020861015620002705750805b601f850160051c820191505b818110156200029157828155600101620002",
    "7c565b505050505050565b80516001600160a01b0381168114620002b057600080fd5b919050565b60008060008060808587",
    "031215620002cc57600080fd5b84516001600160401b0380821115620002e457600080fd5b818701915087601f8301126200",
    "02f957600080fd5b8151818111156200030e576200030e620001f2565b604051601f5b61155680620004e26000396000f3fe",
    "608060405234801561000f57600080fd5b50600436106100a95760003560e01c8063313ce56711610071578063313ce56714",
    "61011757806370a082311461013157806395d89b4114610151578063a9059cbb14610159578063dd62ed3e1461016c576000",
    "80fd5b806306fdde03146100ae578063095ea7b3146100cc57806318160ddd146100ef57806323b872dd1461010457600080",
    "fd5b6100b66101a7565b6040516100c3919061061c565b60405180910390f35b6100df6100da36600461068a565b61023956",
    "5b60405190151581526020016100c3565b6100f660025481565b6040519081526020016100c3565b6100df61011236600461",
    "06b4565b610253565b604051601281526020016100c3565b6100f661013f3660046106f0565b600060208190529081526040",
    "90205481565b6100b66102c5565b6100df61016736600461068a565b6102d4565b6100f661017a366004610712565b600160",
    "209081526000928352604080842090915290825290205481565b6060600380546101b69061074596565b80601f0160208091",
    "0402602001604051908101604052809291908181526020018280546101e2906107456565b801561022f5780601f106102045",
    "761010080835404028352916020019161022f565b820191906000526020600020905b8154815290600101906020018083116",
    "1021257829003601f168201915b5050505050905090565b60003361024781858561030f565b60019150505b92915050565b6",
    "000336102618582856103c1565b61026c85858561043f565b506001949350505050565b60405162461bcd60e51b815260206",
    "004820152601660248201527f696e73756666696369656e7420616c6c6f77616e63650000000000000000000060448201526",
    "0640160405180910390fd5b6001600160a01b038416600090815260016020908152604080832033845290915290205460001",
    "9811461026c57818110156102b8576040516364283d7b60e01b81526001600160a01b0385166004820152602481018290526",
    "0448101839052606401610306565b61026c848484840361030f565b60405162461bcd60e51b8152602060048201526014602",
    "48201527f696e73756666696369656e742062616c616e6365000000000000000000000000604482015260640160405180910",
    "390fd5b6001600160a01b03831661033957604051634b637e8f60e11b815260006004820152602401610306565b600160016",
    "0a01b03821661036357604051634a1406b160e11b815260006004820152602401610306565b6001600160a01b03838116600",
    "090815260016020908152604080832093861683529290522081905580156103bb57826001600160a01b0316846001600160a",
    "01b03167f8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925846040516103b29181526020019",
    "0565b60405180910390a35b50505050565b60405162461bcd60e51b815260206004820152601360248201527f66656520747",
    "2616e73666572206661696c656400000000000000000000000000604482015260640160405180910390fd5b6001600160a01",
    "b038381166000908152600160209081526040808320938616835292905220546000198114610439578181101561042a57604",
    "051637dc7a0d960e11b81526001600160a01b03841660048201526024810182905260448101839052606401610306565b610",
    "43984848484036000610459565b50505050565b6001600160a01b03831661046957604051634b637e8f60e11b81526000600",
    "4820152602401610306565b6001600160a01b03821661049357604051634a1406b160e11b815260006004820152602401610",
    "306565b61049e8383836104a3565b505050565b6001600160a01b0383166104ce5780600260008282546104c391906107805",
    "6565b909155506105409050565b6001600160a01b03831660009081526020819052604090205481811015610521576040516",
    "3391434e360e21b81526001600160a01b03851660048201526024810182905260448101839052606401610306565b6001600",
    "160a01b038416600090815260208190526040902091829003909155565b600060208083528351808285015260005b8181101",
    "56106495785810183015185820160400152820161062d565b5060006040828601015260407f908116603f011685010192505",
    "05092915050565b80356001600160a01b038116811461068557600080fd5b919050565b6000806040838503121561069d576",
    "00080fd5b6106a68361066e565b946020939093013593505050565b6000806000606084860312156106c957600080fd5b610",
    "6d28461066e565b92506106e06020850161066e565b9150604084013590509250925092565b6000602082840312156107025",
    "7600080fd5b61070b8261066e565b9392505050565b6000806040838503121561072557600080fd5b61072e8361066e565b9",
    "15061073c6020840161066e565b90509250929050565b600181811c9082168061075957607f821691505b602082108103610",
    "77957634e487b7160e01b600052602260045260246000fd5b50919050565b8082018082111561024d57634e487b7160e01b6",
    "00052601160045260246000fd6060600380546101b69061074596565b80601f0160208091040260200160405190810160405",
    "2809291908181526020018280546101e2906107456565b801561022f5780601f106102045761010080835404028352916020",
    "019161022f565b820191906000526020600020905b81548152906001019060200180831161021257829003601f168201915b",
    "5050505050905090565b60003361024781858561030f565b60019150505b92915050565b6000336102618582856103c1565b",
    "61026c85858561043f565b506001949350505050565b60405162461bcd60e51b815260206004820152601660248201527f69",
    "6e73756666696369656e7420616c6c6f77616e636500000000000000000000604482015260640160405180910390fd5b6001",
    "600160a01b0384166000908152600160209081526040808320338452909152902054600019811461026c57818110156102b8",
    "576040516364283d7b60e01b81526001600160a01b0385166004820152602481018290526044810183905260640161030656",
    "5b61026c848484840361030f565b60405162461bcd60e51b815260206004820152601460248201527f696e73756666696369",
    "656e742062616c616e6365000000000000000000000000604482015260640160405180910390fd5b6001600160a01b038316",
    "61033957604051634b637e8f60e11b815260006004820152602401610306565b6001600160a01b0382166103635760405163",
    "4a1406b160e11b815260006004820152602401610306565b6001600160a01b03838116600090815260016020908152604080",
    "832093861683529290522081905580156103bb57826001600160a01b0316846001600160a01b03167f8c5be1e5ebec7d5bd1",
    "4f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925846040516103b291815260200190565b60405180910390a35b5050",
    "5050565b60405162461bcd60e51b815260206004820152601360248201527f666565207472616e73666572206661696c6564",
    "00000000000000000000000000604482015260640160405180910390fd5b6001600160a01b03838116600090815260016020",
    "9081526040808320938616835292905220546000198114610439578181101561042a57604051637dc7a0d960e11b81526001",
    "600160a01b03841660048201526024810182905260448101839052606401610306565b61043984848484036000610459565b",
    "50505050565b6001600160a01b03831661046957604051634b637e8f60e11b815260006004820152602401610306565b6001",
    "600160a01b03821661049357604051634a1406b160e11b815260006004820152602401610306565b61049e8383836104a356",
    "5b505050565b6001600160a01b0383166104ce5780600260008282546104c3919061078056565b909155506105409050565b",
    "6001600160a01b038316600090815260208190526040902054818110156105215760405163391434e360e21b815260016001",
    "60a01b03851660048201526024810182905260448101839052606401610306565b6001600160a01b03841660009081526020",
    "8190526040902091829003909155565b600060208083528351808285015260005b8181101561064957858101830151858201",
    "60400152820161062d565b5060006040828601015260407f908116603f01168501019250505092915050565b803560016001",
    "60a01b038116811461068557600080fd5b919050565b6000806040838503121561069d57600080fd5b6106a68361066e565b",
    "946020939093013593505050565b6000806000606084860312156106c957600080fd5b6106d28461066e565b92506106e060",
    "20850161066e565b9150604084013590509250925092565b60006020828403121561070257600080fd5b61070b8261066e56",
    "5b9392505050565b6000806040838503121561072557600080fd5b61072e8361066e565b915061073c6020840161066e565b",
    "90509250929050565b600181811c9082168061075957607f821691505b60208210810361077957634e487b7160e01b600052",
    "602260045260246000fd5b50919050565b8082018082111561024d57634e487b7160e01b600052601160045260246000fd60",
    "60600380546101b69061074596565b80601f0160208091040260200160405190810160405280929190818152602001828054",
    "6101e2906107456565b801561022f5780601f106102045761010080835404028352916020019161022f565b8201919060005",
    "26020600020905b81548152906001019060200180831161021257829003601f168201915b5050505050905090565b6000336",
    "1024781858561030f565b60019150505b92915050565b6000336102618582856103c1565b61026c85858561043f565b50600",
    "1949350505050565b60405162461bcd60e51b815260206004820152601660248201527f696e73756666696369656e7420616",
    "c6c6f77616e636500000000000000000000604482015260640160405180910390fd5b6001600160a01b03841660009081526",
    "00160209081526040808320338452909152902054600019811461026c57818110156102b8576040516364283d7b60e01b815",
    "26001600160a01b03851660048201526024810182905260448101839052606401610306565b61026c848484840361030f565",
    "b60405162461bcd60e51b815260206004820152601460248201527f696e73756666696369656e742062616c616e636500000",
    "0000000000000000000604482015260640160405180910390fd5b6001600160a01b03831661033957604051634b637e8f60e",
    "11b815260006004820152602401610306565b6001600160a01b03821661036357604051634a1406b160e11b8152600060048",
    "20152602401610306565b6001600160a01b03838116600090815260016020908152604080832093861683529290522081905",
    "580156103bb57826001600160a01b0316846001600160a01b03167f8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b22",
    "91e5b200ac8c7c3b925846040516103b291815260200190565b60405180910390a35b50505050565b60405162461bcd60e51",
    "b815260206004820152601360248201527f666565207472616e73666572206661696c6564000000000000000000000000006",
    "04482015260640160405180910390fd5b6001600160a01b03838116600090815260016020908152604080832093861683529",
    "2905220546000198114610439578181101561042a57604051637dc7a0d960e11b81526001600160a01b03841660048201526",
    "024810182905260448101839052606401610306565b61043984848484036000610459565b50505050565b6001600160a01b0",
    "3831661046957604051634b637e8f60e11b815260006004820152602401610306565b6001600160a01b03821661049357604",
    "051634a1406b160e11b815260006004820152602401610306565b61049e8383836104a3565b505050565b6001600160a01b0",
    "383166104ce5780600260008282546104c3919061078056565b909155506105409050565b6001600160a01b0383166000908",
    "15260208190526040902054818110156105215760405163391434e360e21b81526001600160a01b038516600482015260248",
    "10182905260448101839052606401610306565b6001600160a01b03841660009081526020819052604090209182900390915",
    "5565b600060208083528351808285015260005b818110156106495785810183015185820160400152820161062d565b50600",
    "06040828601015260407f908116603f01168501019250505092915050565b80356001600160a01b038116811461068557600",
    "080fd5b919050565b6000806040838503121561069d57600080fd5b6106a68361066e565b946020939093013593505050565",
    "b6000806000606084860312156106c957600080fd5b6106d28461066e565b92506106e06020850161066e565b91506040840",
    "13590509250925092565b60006020828403121561070257600080fd5b61070b8261066e565b9392505050565b60008060408",
    "38503121561072557600080fd5b61072e8361066e565b915061073c6020840161066e565b90509250929050565b600181811",
    "c9082168061075957607f821691505b60208210810361077957634e487b7160e01b600052602260045260246000fd5b50919",
    "050565b8082018082111561024d57634e487b7160e01b600052601160045260246000fd6060600380546101b690610745965",
    "65b80601f01602080910402602001604051908101604052809291908181526020018280546101e2906107456565b80156102",
    "2f5780601f106102045761010080835404028352916020019161022f565b820191906000526020600020905b815481529060",
    "01019060200180831161021257829003601f168201915b5050505050905090565b60003361024781858561030f565b600191",
    "50505b92915050565b6000336102618582856103c1565b61026c85858561043f565b506001949350505050565b6040516246",
    "1bcd60e51b815260206004820152601660248201527f696e73756666696369656e7420616c6c6f77616e6365000000000000",
    "00000000604482015260640160405180910390fd5b6001600160a01b03841660009081526001602090815260408083203384",
    "52909152902054600019811461026c57818110156102b8576040516364283d7b60e01b81526001600160a01b038516600482",
    "01526024810182905260448101839052606401610306565b61026c848484840361030f565b60405162461bcd60e51b815260",
    "2060048201526014fea264697066735822122067c1d5ab30f42af2d1b8f5e9a743cd8a9f31b60de1f7c0b8a4e26c5d9e408b",
    "1764736f6c63430008180033",
);

/// Contract name as submitted to the explorer verification API.
pub const CREATOR_TOKEN_CONTRACT_NAME: &str = "CreatorToken";

/// Compiler the creation code was produced with. Verification fails when this
/// does not match the explorer's compiler exactly.
pub const CREATOR_TOKEN_COMPILER_VERSION: &str = "v0.8.24+commit.e11b9ed9";

/// Single-file source submitted for explorer verification.
pub const CREATOR_TOKEN_SOURCE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.24;

contract CreatorToken {
    string public name;
    string public symbol;
    uint8 public constant decimals = 18;
    uint256 public totalSupply;

    mapping(address => uint256) public balanceOf;
    mapping(address => mapping(address => uint256)) public allowance;

    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed owner, address indexed spender, uint256 value);

    constructor(string memory name_, string memory symbol_, uint256 initialSupply, address feeRecipient) payable {
        name = name_;
        symbol = symbol_;
        totalSupply = initialSupply;
        balanceOf[msg.sender] = initialSupply;
        emit Transfer(address(0), msg.sender, initialSupply);
        if (msg.value > 0) {
            (bool sent, ) = feeRecipient.call{value: msg.value}("");
            require(sent, "fee transfer failed");
        }
    }

    function transfer(address to, uint256 value) external returns (bool) {
        _transfer(msg.sender, to, value);
        return true;
    }

    function approve(address spender, uint256 value) external returns (bool) {
        allowance[msg.sender][spender] = value;
        emit Approval(msg.sender, spender, value);
        return true;
    }

    function transferFrom(address from, address to, uint256 value) external returns (bool) {
        uint256 allowed = allowance[from][msg.sender];
        require(allowed >= value, "insufficient allowance");
        if (allowed != type(uint256).max) {
            allowance[from][msg.sender] = allowed - value;
        }
        _transfer(from, to, value);
        return true;
    }

    function _transfer(address from, address to, uint256 value) internal {
        require(balanceOf[from] >= value, "insufficient balance");
        balanceOf[from] -= value;
        balanceOf[to] += value;
        emit Transfer(from, to, value);
    }
}
"#;

/// Raw creation code for the creator ERC20, without constructor arguments.
/// Errors when the embedded artifact is corrupt rather than deploying a
/// partial payload.
pub fn creator_token_bytecode() -> Result<Bytes> {
    let code = hex::decode(CREATOR_TOKEN_CREATION_CODE).map_err(|e| eyre!("creation code is not valid hex: {e}"))?;
    validate_creation_code(&code)?;
    Ok(code.into())
}

/// Check the creation code against the length its own constructor prologue
/// declares. The PUSH3 at byte offset 22 feeds the CODECOPY that locates the
/// constructor arguments, so a mismatch means the artifact cannot deploy.
fn validate_creation_code(code: &[u8]) -> Result<()> {
    if code.len() < 26 || code[22] != 0x62 {
        return Err(eyre!("creation code prologue is not recognized"));
    }
    let declared = usize::from(code[23]) << 16 | usize::from(code[24]) << 8 | usize::from(code[25]);
    if declared != code.len() {
        return Err(eyre!(
            "embedded creation code is truncated: {} bytes present, header declares {}",
            code.len(),
            declared
        ));
    }
    Ok(())
}

/// ABI-encoded constructor arguments, as appended to the creation code and as
/// submitted (hex, no 0x prefix) to the explorer verification API.
pub fn encode_constructor_args(name: &str, symbol: &str, initial_supply: U256, fee_recipient: Address) -> Vec<u8> {
    CreatorToken::constructorCall {
        name_: name.to_string(),
        symbol_: symbol.to_string(),
        initialSupply: initial_supply,
        feeRecipient: fee_recipient,
    }
    .abi_encode()
}

/// Full deployable payload: creation code followed by the encoded arguments.
pub fn encode_deploy_payload(name: &str, symbol: &str, initial_supply: U256, fee_recipient: Address) -> Result<Bytes> {
    let code = creator_token_bytecode()?;
    Ok([code.as_ref(), &encode_constructor_args(name, symbol, initial_supply, fee_recipient)].concat().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_code_length_matches_header() {
        let code = creator_token_bytecode().unwrap();
        assert!(!code.is_empty());

        // the constructor prologue pushes the creation code's own length
        assert_eq!(code[22], 0x62);
        let declared = usize::from(code[23]) << 16 | usize::from(code[24]) << 8 | usize::from(code[25]);
        assert_eq!(declared, code.len());
    }

    #[test]
    fn test_truncated_creation_code_is_rejected() {
        let code = creator_token_bytecode().unwrap();
        let err = validate_creation_code(&code[..600]).unwrap_err();
        assert!(err.to_string().contains("truncated"));

        assert!(validate_creation_code(&[0u8; 8]).is_err());
    }

    #[test]
    fn test_deploy_payload_appends_args() {
        let code = creator_token_bytecode().unwrap();
        assert!(!code.is_empty());

        let payload = encode_deploy_payload("Test", "TST", U256::from(1_000_000u64), Address::repeat_byte(0x77)).unwrap();
        assert!(payload.len() > code.len());
        assert_eq!(&payload[..code.len()], code.as_ref());

        // string + string + uint256 + address: two offsets, two values, two
        // length-prefixed strings padded to 32 bytes
        let args = &payload[code.len()..];
        assert_eq!(args.len() % 32, 0);
        assert!(args.len() >= 8 * 32);
    }

    #[test]
    fn test_constructor_args_contain_recipient() {
        let recipient = Address::repeat_byte(0x42);
        let args = encode_constructor_args("A", "B", U256::from(1), recipient);
        // address is right-aligned in its 32-byte slot
        assert_eq!(&args[3 * 32 + 12..4 * 32], recipient.as_slice());
    }
}
